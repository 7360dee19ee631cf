//! Argon2id password hashing.

use argon2::{Algorithm, Argon2, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use password_hash::SaltString;
use password_hash::rand_core::OsRng;

use super::{CredentialConfig, CredentialError};

/// Argon2id hasher with a fixed work factor.
///
/// Output is a PHC string that embeds algorithm, version, parameters and
/// salt, so verification needs nothing but the string itself.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new(config: &CredentialConfig) -> Result<Self, CredentialError> {
        let params = config.argon2_params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Constant-time verification against a stored PHC string.
    ///
    /// An unparseable hash is reported as a mismatch, never as a distinct
    /// failure.
    pub fn verify_password(&self, hash: &str, password: &str) -> Result<(), CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::PasswordMismatch)?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| CredentialError::PasswordMismatch)
    }
}

impl core::fmt::Debug for Argon2PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let params = self.argon2.params();
        f.debug_struct("Argon2PasswordHasher")
            .field("m_cost", &params.m_cost())
            .field("t_cost", &params.t_cost())
            .field("p_cost", &params.p_cost())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> Argon2PasswordHasher {
        let config = CredentialConfig::default().with_hash_cost(8, 1, 1);
        Argon2PasswordHasher::new(&config).unwrap()
    }

    #[test]
    fn hash_and_verify_correct_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_password("my-secret-password").unwrap();
        assert_eq!(hasher.verify_password(&hash, "my-secret-password"), Ok(()));
    }

    #[test]
    fn verify_wrong_password_is_a_mismatch() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_password("correct-password").unwrap();
        assert_eq!(
            hasher.verify_password(&hash, "wrong-password"),
            Err(CredentialError::PasswordMismatch)
        );
    }

    #[test]
    fn hash_embeds_parameters_and_salt() {
        let hasher = cheap_hasher();
        let first = hasher.hash_password("same").unwrap();
        let second = hasher.hash_password("same").unwrap();

        assert!(first.starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
        assert_ne!(first, second, "salts must differ");
    }

    #[test]
    fn verification_uses_parameters_from_the_hash() {
        let stronger = Argon2PasswordHasher::new(&CredentialConfig::default().with_hash_cost(16, 2, 1))
            .unwrap();
        let hash = stronger.hash_password("pw").unwrap();

        assert_eq!(cheap_hasher().verify_password(&hash, "pw"), Ok(()));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        let hasher = cheap_hasher();
        assert_eq!(
            hasher.verify_password("not-a-phc-string", "pw"),
            Err(CredentialError::PasswordMismatch)
        );
    }
}
