//! Authentication endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service_core::error::AppError;

use crate::{
    AppState,
    dtos::{
        ErrorResponse, MessageResponse,
        auth::{
            LoginRequest, RegisterRequest, SendVerificationRequest, UserResponse,
            VerifyAccountRequest, VerifyLoginRequest,
        },
    },
    middleware::{AUTH_SESSION_COOKIE, CurrentUser, USER_SESSION_COOKIE},
    models::LoginSession,
    services::ServiceError,
    utils::ValidatedJson,
};

fn login_session_cookie(session: &LoginSession) -> Cookie<'static> {
    let expires = time::OffsetDateTime::from_unix_timestamp(session.expiry_utc.timestamp())
        .unwrap_or(time::OffsetDateTime::UNIX_EPOCH);
    Cookie::build((USER_SESSION_COOKIE, session.session_id.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .expires(expires)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 409, description = "Email or username taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Login with email and password; sends the login OTP
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth_service.login(req).await?;

    let jar = jar.add(
        Cookie::build((AUTH_SESSION_COOKIE, session.session_id))
            .http_only(true)
            .path("/")
            .build(),
    );

    Ok((jar, Json(MessageResponse::new("OTP sent."))))
}

/// Present the login OTP bound to the pre-auth cookie
#[utoipa::path(
    post,
    path = "/auth/verify-login",
    request_body = VerifyLoginRequest,
    responses(
        (status = 200, description = "Login verified", body = MessageResponse),
        (status = 401, description = "Wrong token or unavailable session", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn verify_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<VerifyLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth_session_id = jar
        .get(AUTH_SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::from(ServiceError::SessionUnavailable))?;

    let login_session = state
        .auth_service
        .authenticate(&req.token, &auth_session_id)
        .await?;

    let jar = jar
        .add(login_session_cookie(&login_session))
        .remove(removal_cookie(AUTH_SESSION_COOKIE));

    Ok((jar, Json(MessageResponse::new("Login verified successfully."))))
}

/// Present the account-verification OTP
#[utoipa::path(
    post,
    path = "/auth/verify-account",
    request_body = VerifyAccountRequest,
    responses(
        (status = 200, description = "Account verified", body = MessageResponse),
        (status = 401, description = "Wrong token or unavailable session", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn verify_account(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state
        .auth_service
        .verify_account(&req.token, &req.session_id)
        .await?;
    Ok(Json(res))
}

/// Re-send the account verification email
#[utoipa::path(
    post,
    path = "/auth/send-verification",
    request_body = SendVerificationRequest,
    responses(
        (status = 200, description = "Verification email queued", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn send_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendVerificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.send_verification(&req.email).await?;
    Ok(Json(res))
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Logout by clearing the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    // Cookie-clear only; the session row ages out at its natural expiry.
    let jar = jar.remove(removal_cookie(USER_SESSION_COOKIE));
    (jar, Json(MessageResponse::new("Logged out successfully.")))
}
