//! Cookie-based authentication extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::AppState;
use crate::models::User;

/// Bearer cookie holding the LoginSession id.
pub const USER_SESSION_COOKIE: &str = "user_session_id";
/// Pre-auth cookie holding the AuthSession id while the login OTP is pending.
pub const AUTH_SESSION_COOKIE: &str = "_auths";
/// Public answer-session cookie for anonymous form responses.
pub const ANSWER_SESSION_COOKIE: &str = "response_session_id";

fn jar_from_parts(parts: &mut Parts) -> CookieJar {
    CookieJar::from_headers(&parts.headers)
}

/// Extractor requiring an authenticated, verified user.
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = jar_from_parts(parts);
        let session_id = jar.get(USER_SESSION_COOKIE).map(|c| c.value().to_string());
        let user = state
            .auth_service
            .current_user(session_id.as_deref())
            .await
            .map_err(AppError::from)?;
        Ok(CurrentUser(user))
    }
}

/// Extractor that swallows every authentication failure and yields `None`,
/// for endpoints that serve both authenticated and anonymous callers.
pub struct OptionalUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = jar_from_parts(parts);
        let session_id = jar.get(USER_SESSION_COOKIE).map(|c| c.value().to_string());
        let user = state
            .auth_service
            .current_user_opt(session_id.as_deref())
            .await;
        Ok(OptionalUser(user))
    }
}
