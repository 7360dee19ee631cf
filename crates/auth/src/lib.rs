//! `tollgate-auth` — credential and authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: transport
//! layers hand it header values and vocabulary, and map its typed failures
//! onto their own wire formats.

pub mod claims;
pub mod credentials;
pub mod gate;
pub mod permissions;
pub mod registry;
pub mod roles;

pub use claims::{Identity, TokenClaims, validate_claims};
pub use credentials::{CredentialConfig, CredentialError, CredentialService};
pub use gate::{AccessError, AccessGate, Registration, extract_bearer};
pub use permissions::{ActionType, Permission, ResourceType};
pub use registry::{AuthzError, DEFAULT_ADMIN_ROLE, DEFAULT_USER_ROLE, RoleRegistry};
pub use roles::{Role, RoleType};
