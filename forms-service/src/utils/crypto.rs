//! Opaque session ids and numeric one-time codes.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, RngCore};
use subtle::ConstantTimeEq;

/// Generate a cryptographically random URL-safe id from `size` random bytes.
pub fn gen_id(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a numeric one-time code of `digits` digits.
pub fn gen_otp(digits: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..digits)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Constant-time token comparison.
///
/// Length differences short-circuit inside `ct_eq`, which is acceptable:
/// the code length is public knowledge.
pub fn tokens_match(supplied: &str, stored: &str) -> bool {
    supplied.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_id_is_url_safe() {
        let id = gen_id(30);
        assert!(!id.is_empty());
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn gen_id_is_unique() {
        assert_ne!(gen_id(30), gen_id(30));
    }

    #[test]
    fn gen_otp_has_requested_digits() {
        let otp = gen_otp(8);
        assert_eq!(otp.len(), 8);
        assert!(otp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn tokens_match_compares_exactly() {
        assert!(tokens_match("12345678", "12345678"));
        assert!(!tokens_match("12345678", "12345679"));
        assert!(!tokens_match("1234", "12345678"));
    }
}
