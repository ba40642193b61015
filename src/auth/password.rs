use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[source] bcrypt::BcryptError),
    #[error("Stored password digest is unreadable: {0}")]
    Verify(#[source] bcrypt::BcryptError),
}

/// bcrypt digest at `cost` (see `SecurityConfig::bcrypt_cost`)
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(PasswordError::Hash)
}

/// `Ok(false)` on mismatch; `Err` only when `digest` is not a bcrypt hash
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, digest).map_err(PasswordError::Verify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_password() {
        let stored = hash_password("12345678", 4 /* bcrypt MIN_COST */).unwrap();
        assert!(stored.starts_with("$2"));
        assert!(verify_password("12345678", &stored).unwrap());
        assert!(!verify_password("12345679", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("password", 4 /* bcrypt MIN_COST */).unwrap();
        let second = hash_password("password", 4 /* bcrypt MIN_COST */).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(matches!(verify_password("password", ""), Err(PasswordError::Verify(_))));
        assert!(matches!(
            verify_password("password", "sha256$1$salt$abc"),
            Err(PasswordError::Verify(_))
        ));
    }

    #[test]
    fn out_of_range_cost_is_an_error() {
        assert!(matches!(hash_password("password", 2), Err(PasswordError::Hash(_))));
    }
}
