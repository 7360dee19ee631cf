//! Caller-facing composition of the credential service and role registry.
//!
//! Transport layers hand the gate an `Authorization` header value and the
//! `(resource, action)` they need; the gate validates the bearer token, then
//! asks the registry using the role *name* carried in the claims. Failure
//! reasons are collapsed before they leave this module.

use std::sync::Arc;

use thiserror::Error;
use tollgate_core::IdGenerator;

use crate::{
    ActionType, AuthzError, CredentialError, CredentialService, Identity, ResourceType,
    RoleRegistry, TokenClaims,
};

/// Externally visible outcome of a gate operation.
///
/// Deliberately coarse: the precise credential failure is only available in
/// debug logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error")]
    Internal,
}

impl From<CredentialError> for AccessError {
    fn from(value: CredentialError) -> Self {
        if value.is_authentication_failure() {
            tracing::debug!(reason = %value, "credential check failed");
            AccessError::Unauthenticated
        } else {
            tracing::error!(error = %value, "credential service failure");
            AccessError::Internal
        }
    }
}

impl From<AuthzError> for AccessError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::InvalidResource(_) | AuthzError::InvalidAction(_) => {
                AccessError::InvalidRequest(value.to_string())
            }
            AuthzError::RoleNotFound(_) | AuthzError::PermissionDenied { .. } => {
                tracing::debug!(reason = %value, "authorization denied");
                AccessError::Forbidden
            }
        }
    }
}

/// Result of a successful registration. The caller persists what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub identity: Identity,
    pub password_hash: String,
    pub token: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: &str) -> Result<&str, AccessError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AccessError::Unauthenticated)?
        .trim();

    if token.is_empty() {
        return Err(AccessError::Unauthenticated);
    }

    Ok(token)
}

/// Single authentication and authorization entry point for request handlers.
#[derive(Clone)]
pub struct AccessGate {
    credentials: Arc<CredentialService>,
    registry: Arc<RoleRegistry>,
    ids: Arc<dyn IdGenerator>,
}

impl AccessGate {
    pub fn new(
        credentials: Arc<CredentialService>,
        registry: Arc<RoleRegistry>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            credentials,
            registry,
            ids,
        }
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Validate the bearer token in an `Authorization` header value.
    pub fn authenticate(&self, authorization: &str) -> Result<TokenClaims, AccessError> {
        let token = extract_bearer(authorization)?;
        Ok(self.credentials.validate_token(token)?)
    }

    /// Ask the registry whether the claims' role may perform `action` on `resource`.
    pub fn authorize(
        &self,
        claims: &TokenClaims,
        resource: &ResourceType,
        action: &ActionType,
    ) -> Result<(), AccessError> {
        self.registry
            .check_permission(&claims.role, resource, action)
            .map_err(AccessError::from)?;

        tracing::debug!(
            user_id = %claims.user_id,
            role = %claims.role,
            %resource,
            %action,
            "access granted"
        );
        Ok(())
    }

    /// [`authenticate`](Self::authenticate) then [`authorize`](Self::authorize).
    pub fn authorize_request(
        &self,
        authorization: &str,
        resource: &ResourceType,
        action: &ActionType,
    ) -> Result<TokenClaims, AccessError> {
        let claims = self.authenticate(authorization)?;
        self.authorize(&claims, resource, action)?;
        Ok(claims)
    }

    /// Create an identity bound to a registered role and issue its first token.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<Registration, AccessError> {
        if username.trim().is_empty() {
            return Err(AccessError::InvalidRequest("username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AccessError::InvalidRequest("password is required".to_string()));
        }
        if !self.registry.has_role(role) {
            return Err(AccessError::InvalidRequest(format!("unknown role: {role}")));
        }

        let password_hash = self.credentials.hash_password(password)?;
        let identity = Identity::new(self.ids.next_id(), username, role);
        let token = self.credentials.generate_token(&identity)?;

        tracing::debug!(user_id = %identity.user_id, role = %identity.role, "identity registered");
        Ok(Registration {
            identity,
            password_hash,
            token,
        })
    }

    /// Check `password` against the caller's stored hash and issue a token.
    ///
    /// A wrong password is reported exactly like an unknown user.
    pub fn login(
        &self,
        identity: &Identity,
        stored_hash: &str,
        password: &str,
    ) -> Result<String, AccessError> {
        self.credentials.compare_passwords(stored_hash, password)?;
        Ok(self.credentials.generate_token(identity)?)
    }
}

impl core::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessGate")
            .field("credentials", &self.credentials)
            .field("roles", &self.registry.len())
            .finish_non_exhaustive()
    }
}
