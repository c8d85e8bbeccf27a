use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::User;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "alice")]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub password_confirm: String,

    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Alice Doe")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// OTP presentation against the account-verification session.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyAccountRequest {
    #[validate(length(min = 1, message = "Session id is required"))]
    pub session_id: String,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// OTP presentation against the cookie-bound auth session.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyLoginRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendVerificationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub verified: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            email: u.email,
            name: u.display_name,
            verified: u.verified,
            created_utc: u.created_utc,
        }
    }
}
