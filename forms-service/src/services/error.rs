use service_core::error::AppError;
use thiserror::Error;

/// Service-layer error taxonomy.
///
/// User-visible messages are fixed per kind. In particular, every session
/// failure collapses to the same wording regardless of whether the session
/// was missing, expired or exhausted; the distinction only reaches the
/// internal logs.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated.")]
    NotAuthenticated,

    #[error("Session not found or expired")]
    SessionUnavailable,

    #[error("Invalid token")]
    InvalidOtp,

    #[error("{0}")]
    NotAuthorized(String),

    #[error("User not found")]
    UserNotFound,

    #[error("An account with this email or username already exists")]
    AccountExists,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Form not found")]
    FormNotFound,

    #[error("Field not found")]
    FieldNotFound,

    #[error("Answer session not found")]
    AnswerSessionNotFound,

    #[error("Answer not found")]
    AnswerNotFound,

    #[error("This form is not accepting responses")]
    FormClosed,

    #[error("Deadline reached.")]
    DeadlineReached,

    #[error("Submissions limit reached.")]
    SubmissionsLimitReached,

    #[error("Field '{0}' not answered.")]
    RequiredFieldMissing(String),

    #[error("Could not validate answer")]
    InvalidAnswer,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::App(e) => e,
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::NotAuthenticated => {
                AppError::Unauthorized(anyhow::anyhow!("Not authenticated."))
            }
            ServiceError::SessionUnavailable => {
                AppError::Unauthorized(anyhow::anyhow!("Session not found or expired"))
            }
            ServiceError::InvalidOtp => AppError::Unauthorized(anyhow::anyhow!("Invalid token")),
            ServiceError::NotAuthorized(msg) => AppError::Unauthorized(anyhow::anyhow!(msg)),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::AccountExists => AppError::Conflict(anyhow::anyhow!(
                "An account with this email or username already exists"
            )),
            ServiceError::PasswordMismatch => {
                AppError::Unprocessable(anyhow::anyhow!("Passwords do not match"))
            }
            ServiceError::FormNotFound => AppError::NotFound(anyhow::anyhow!("Form not found")),
            ServiceError::FieldNotFound => AppError::NotFound(anyhow::anyhow!("Field not found")),
            ServiceError::AnswerSessionNotFound => {
                AppError::NotFound(anyhow::anyhow!("Answer session not found"))
            }
            ServiceError::AnswerNotFound => AppError::NotFound(anyhow::anyhow!("Answer not found")),
            ServiceError::FormClosed => {
                AppError::Unprocessable(anyhow::anyhow!("This form is not accepting responses"))
            }
            ServiceError::DeadlineReached => {
                AppError::Unprocessable(anyhow::anyhow!("Deadline reached."))
            }
            ServiceError::SubmissionsLimitReached => {
                AppError::Unprocessable(anyhow::anyhow!("Submissions limit reached."))
            }
            ServiceError::RequiredFieldMissing(label) => {
                AppError::Unprocessable(anyhow::anyhow!("Field '{}' not answered.", label))
            }
            ServiceError::InvalidAnswer => {
                AppError::Unprocessable(anyhow::anyhow!("Could not validate answer"))
            }
            ServiceError::ValidationError(msg) => AppError::Unprocessable(anyhow::anyhow!(msg)),
            ServiceError::EmailError(msg) => AppError::EmailError(msg),
            ServiceError::TranslationError(msg) => AppError::BadGateway(msg),
        }
    }
}
