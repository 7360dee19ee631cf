//! Credential service: password hashing and signed, time-bounded tokens.
//!
//! Stateless apart from the signing secret, which is fixed for the lifetime
//! of a [`CredentialService`] instance. Tokens issued by one instance only
//! validate against that same instance (or one built with the same secret).

mod config;
mod password;
mod token;

pub use config::{CredentialConfig, MIN_SECRET_LEN};
pub use password::Argon2PasswordHasher;
pub use token::{ACCEPTED_ALGORITHMS, ISSUED_ALGORITHM, declared_algorithm};

use chrono::{DateTime, Utc};
use password_hash::rand_core::{OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::claims::validate_claims;
use crate::{Identity, TokenClaims};
use token::TokenCodec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("token signing failed: {0}")]
    SigningFailure(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid credential configuration: {0}")]
    Configuration(String),
}

impl CredentialError {
    /// True for failures that mean "bad credentials" rather than an internal fault.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            CredentialError::PasswordMismatch
                | CredentialError::MalformedToken(_)
                | CredentialError::UnsupportedAlgorithm(_)
                | CredentialError::SignatureInvalid
                | CredentialError::TokenExpired
        )
    }
}

/// Password hashing plus HMAC-signed token issuance and validation.
///
/// Immutable after construction and safe to share across threads behind an
/// `Arc`. Hashing is deliberately slow; never call it while holding a lock.
pub struct CredentialService {
    config: CredentialConfig,
    hasher: Argon2PasswordHasher,
    codec: TokenCodec,
}

impl CredentialService {
    /// Service with default configuration and a fresh random secret.
    pub fn new() -> Result<Self, CredentialError> {
        Self::from_config(CredentialConfig::default())
    }

    /// Service with a fresh random secret of `config.secret_len` bytes.
    pub fn from_config(config: CredentialConfig) -> Result<Self, CredentialError> {
        config.validate()?;

        let mut secret = Zeroizing::new(vec![0u8; config.secret_len]);
        OsRng
            .try_fill_bytes(secret.as_mut_slice())
            .map_err(|e| CredentialError::SigningFailure(format!("secret generation: {e}")))?;

        Self::build(config, secret.as_slice())
    }

    /// Service with an explicit secret (shared deployments, deterministic tests).
    pub fn with_secret(config: CredentialConfig, secret: &[u8]) -> Result<Self, CredentialError> {
        config.validate()?;

        if secret.is_empty() {
            return Err(CredentialError::Configuration(
                "signing secret must not be empty".to_string(),
            ));
        }
        if secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                len = secret.len(),
                recommended = MIN_SECRET_LEN,
                "signing secret is shorter than recommended"
            );
        }

        Self::build(config, secret)
    }

    fn build(config: CredentialConfig, secret: &[u8]) -> Result<Self, CredentialError> {
        let hasher = Argon2PasswordHasher::new(&config)?;
        Ok(Self {
            config,
            hasher,
            codec: TokenCodec::new(secret),
        })
    }

    pub fn config(&self) -> &CredentialConfig {
        &self.config
    }

    /// Salted Argon2id hash in PHC string form.
    pub fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        self.hasher.hash_password(plaintext)
    }

    /// `Ok(())` iff `plaintext` matches `hash`; otherwise `PasswordMismatch`.
    pub fn compare_passwords(&self, hash: &str, plaintext: &str) -> Result<(), CredentialError> {
        self.hasher.verify_password(hash, plaintext)
    }

    pub fn generate_token(&self, identity: &Identity) -> Result<String, CredentialError> {
        self.generate_token_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn generate_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = TokenClaims::for_identity(identity, now, self.config.token_ttl());
        self.codec.encode(&claims)
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, CredentialError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Verify `token` and check its expiry against `now`.
    ///
    /// The codec rejects tokens expired by the wall clock; the explicit check
    /// against `now` runs regardless.
    pub fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, CredentialError> {
        let claims = self.codec.decode(token)?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

impl core::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialService")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .field("codec", &self.codec)
            .finish()
    }
}
