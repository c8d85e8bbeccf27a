pub mod auth;

pub use auth::{
    ANSWER_SESSION_COOKIE, AUTH_SESSION_COOKIE, CurrentUser, OptionalUser, USER_SESSION_COOKIE,
};
