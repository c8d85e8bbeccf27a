//! Services layer.
//!
//! Business logic for authentication, authorization, session lifecycle,
//! forms and the external collaborators (email, translation, validation).

pub mod auth;
pub mod authz;
pub mod email;
pub mod error;
pub mod forms;
pub mod sessions;
pub mod translation;
pub mod validation;

pub use auth::{AuthService, AuthSettings};
pub use authz::{ADMIN_ROLE_NAME, PermissionCheck, PermissionChecker, SUPER_ADMIN_ROLE_NAME};
pub use email::{EmailJob, EmailProvider, Mailer, MockEmailService, SmtpEmailService};
pub use error::ServiceError;
pub use forms::FormService;
pub use sessions::{SessionService, SessionSettings};
pub use translation::{GeminiTranslator, MockTranslator, SupportedLanguage, TranslationProvider};
