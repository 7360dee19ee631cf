use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use tollgate_core::UserId;

use crate::CredentialError;

/// Identity handed to token issuance.
///
/// Ephemeral: the caller owns it (including allocating `user_id`); the
/// credential layer only signs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    /// Registry role name granted to this identity.
    pub role: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role: role.into(),
        }
    }
}

/// Claim set carried inside a signed token.
///
/// Timestamps are Unix seconds, as on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    pub role: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_identity(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let username = (!identity.username.is_empty()).then(|| identity.username.clone());
        Self {
            user_id: identity.user_id,
            username,
            role: identity.role.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expired once `now` is strictly past `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

/// Deterministically validate the time window of decoded claims.
///
/// Runs after signature verification, independently of whatever expiry
/// handling the codec already applied.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), CredentialError> {
    if claims.is_expired_at(now) {
        return Err(CredentialError::TokenExpired);
    }
    Ok(())
}
