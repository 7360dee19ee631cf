//! Credential service configuration.

use std::time::Duration;

use argon2::Params;
use serde::{Deserialize, Serialize};

use super::CredentialError;

/// Shortest signing secret accepted when generating one.
pub const MIN_SECRET_LEN: usize = 32;

const ENV_TOKEN_TTL_SECS: &str = "TOLLGATE_TOKEN_TTL_SECS";
const ENV_HASH_MEMORY_KIB: &str = "TOLLGATE_HASH_MEMORY_KIB";
const ENV_HASH_ITERATIONS: &str = "TOLLGATE_HASH_ITERATIONS";
const ENV_HASH_PARALLELISM: &str = "TOLLGATE_HASH_PARALLELISM";

/// Tunables for password hashing and token issuance.
///
/// Defaults: 24 hour tokens, Argon2id with m=19456 KiB, t=2, p=1, and a
/// 32 byte signing secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    /// Argon2 time cost (passes).
    pub hash_iterations: u32,
    /// Argon2 lanes.
    pub hash_parallelism: u32,
    /// Length in bytes of a generated signing secret.
    pub secret_len: usize,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 24 * 60 * 60,
            hash_memory_kib: 19_456,
            hash_iterations: 2,
            hash_parallelism: 1,
            secret_len: MIN_SECRET_LEN,
        }
    }
}

impl CredentialConfig {
    /// Defaults overridden by `TOLLGATE_*` environment variables.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `TOLLGATE_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, ENV_TOKEN_TTL_SECS)? {
            config.token_ttl_secs = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_HASH_MEMORY_KIB)? {
            config.hash_memory_kib = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_HASH_ITERATIONS)? {
            config.hash_iterations = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_HASH_PARALLELISM)? {
            config.hash_parallelism = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self
    }

    /// Sets the Argon2 work factor.
    pub fn with_hash_cost(mut self, memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        self.hash_memory_kib = memory_kib;
        self.hash_iterations = iterations;
        self.hash_parallelism = parallelism;
        self
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs)
    }

    pub(crate) fn argon2_params(&self) -> Result<Params, CredentialError> {
        Params::new(
            self.hash_memory_kib,
            self.hash_iterations,
            self.hash_parallelism,
            None,
        )
        .map_err(|e| CredentialError::Configuration(format!("argon2 parameters: {e}")))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CredentialError> {
        // Upper bound keeps `iat + ttl` well inside chrono's range.
        if self.token_ttl_secs <= 0 || self.token_ttl_secs > 10 * 365 * 24 * 60 * 60 {
            return Err(CredentialError::Configuration(format!(
                "token ttl must be between 1 second and 10 years, got {}s",
                self.token_ttl_secs
            )));
        }
        if self.secret_len < MIN_SECRET_LEN {
            return Err(CredentialError::Configuration(format!(
                "secret length must be at least {MIN_SECRET_LEN} bytes, got {}",
                self.secret_len
            )));
        }
        self.argon2_params()?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, CredentialError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CredentialError::Configuration(format!("{key}={raw:?}: {e}"))),
    }
}
