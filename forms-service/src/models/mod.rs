pub mod answer;
pub mod form;
pub mod form_field;
pub mod permission;
pub mod role;
pub mod session;
pub mod user;

pub use answer::{AnswerSession, FieldAnswer};
pub use form::Form;
pub use form_field::{FieldType, FormField};
pub use permission::{Action, Permission, Resource};
pub use role::{Role, RoleGrants, UserRole};
pub use session::{
    AccountVerificationSession, AuthSession, LoginSession, OtpPresentation, SessionState,
};
pub use user::User;
