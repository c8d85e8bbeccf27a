//! Wire-facing request/response shapes.

pub mod auth;
pub mod form;

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Generic success message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
