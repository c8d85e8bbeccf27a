pub mod crypto;
pub mod password;
pub mod validation;

pub use crypto::{gen_id, gen_otp, tokens_match};
pub use password::{hash_password, verify_password};
pub use validation::ValidatedJson;
