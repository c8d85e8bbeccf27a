//! User model - registered accounts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity.
///
/// `email` and `username` are globally unique; uniqueness is checked before
/// insert and additionally enforced by the schema.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub verified: bool,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new, unverified user.
    pub fn new(email: String, username: String, password_hash: String, display_name: String) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            display_name,
            verified: false,
            created_utc: Utc::now(),
        }
    }
}
