use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::error::{AuthError, AuthResult};

/// One-way password hashing with Argon2id and a fresh random salt per hash.
///
/// Hashes are PHC strings (`$argon2id$v=19$...`) that embed their own salt
/// and cost parameters, so any hasher can verify any stored hash regardless
/// of how it was configured.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Hasher with the Argon2id defaults (19 MiB, 2 passes, 1 lane).
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hasher with explicit cost parameters.
    pub fn with_params(memory_kib: u32, passes: u32, lanes: u32) -> AuthResult<Self> {
        let params = Params::new(memory_kib, passes, lanes, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password. Equal inputs give different outputs.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a candidate password against a stored hash.
    ///
    /// The digest comparison is constant-time. Returns `Ok(false)` on a
    /// mismatch and an error only when the stored hash cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> CredentialHasher {
        CredentialHasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn hash_and_verify() {
        let hasher = fast();
        let hash = hasher.hash("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &hash).unwrap());
    }

    #[test]
    fn verify_fails_on_wrong_password() {
        let hasher = fast();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_different_hashes() {
        let hasher = fast();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a).unwrap());
        assert!(hasher.verify("same", &b).unwrap());
    }

    #[test]
    fn default_hasher_verifies_fast_hash() {
        let hash = fast().hash("portable").unwrap();
        assert!(CredentialHasher::new().verify("portable", &hash).unwrap());
    }

    #[test]
    fn hash_does_not_contain_plaintext() {
        let hash = fast().hash("plaintext-secret").unwrap();
        assert!(!hash.contains("plaintext-secret"));
    }

    #[test]
    fn malformed_hash_is_error() {
        let err = fast().verify("pw", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[test]
    fn invalid_params_rejected() {
        assert!(matches!(
            CredentialHasher::with_params(0, 0, 0),
            Err(AuthError::Hashing(_))
        ));
    }
}
