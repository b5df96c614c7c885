use crate::types::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB (19 MiB).
const MEMORY_COST_KIB: u32 = 19 * 1024;
/// Number of passes over memory.
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// One-way salted password hashing with a fixed Argon2id work factor.
///
/// Every call to [`hash`](Self::hash) draws a fresh salt, so hashing the same
/// plaintext twice yields different PHC strings. [`verify`](Self::verify)
/// reads the salt and parameters back out of the stored hash.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Result<Self> {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a password, returning a PHC-formatted string.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored hash.
    ///
    /// A malformed hash is treated as a mismatch rather than an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new().expect("valid parameters")
    }

    #[test]
    fn test_hash_is_phc_formatted() {
        let hash = hasher().hash("Abcdef1").expect("should hash password");

        assert_ne!(hash, "Abcdef1");
        assert!(hash.starts_with("$argon2id$"), "hash should be in PHC format");
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let first = hasher.hash("Abcdef1").expect("should hash");
        let second = hasher.hash("Abcdef1").expect("should hash");

        assert_ne!(first, second, "two hashes of the same password must differ");
        assert!(hasher.verify("Abcdef1", &first));
        assert!(hasher.verify("Abcdef1", &second));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hasher = hasher();
        let hash = hasher.hash("correct_Password1").expect("should hash");

        assert!(!hasher.verify("wrong_Password1", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        let hasher = hasher();

        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "$argon2id$v=19$broken"));
    }
}
