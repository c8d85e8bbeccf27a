//! Password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(plain: &str) -> Result<String, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash.
///
/// A malformed hash verifies as false rather than erroring; the stored hash
/// is trusted input and a parse failure means the credential is unusable.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_argon2_phc_string() {
        let hash = hash_password("mySecurePassword123").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("mySecurePassword123").expect("Failed to hash password");
        assert!(verify_password("mySecurePassword123", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("mySecurePassword123").expect("Failed to hash password");
        assert!(!verify_password("wrongPassword", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-hash"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hash1 = hash_password("mySecurePassword123").unwrap();
        let hash2 = hash_password("mySecurePassword123").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("mySecurePassword123", &hash1));
        assert!(verify_password("mySecurePassword123", &hash2));
    }
}
