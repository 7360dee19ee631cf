use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::registry::AuthzError;

/// Action identifier (the verb half of a permission).
///
/// Actions are carried as opaque strings so that values arriving from the
/// wire can be represented and then rejected by [`ActionType::is_valid`]. Only
/// the members of [`ActionType::ALL`] are valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(Cow<'static, str>);

impl ActionType {
    pub const READ: Self = Self(Cow::Borrowed("read"));
    pub const WRITE: Self = Self(Cow::Borrowed("write"));
    pub const LIST: Self = Self(Cow::Borrowed("list"));
    pub const EXPORT: Self = Self(Cow::Borrowed("export"));
    pub const IMPORT: Self = Self(Cow::Borrowed("import"));
    pub const APPROVE: Self = Self(Cow::Borrowed("approve"));

    /// The closed set of valid actions.
    pub const ALL: [Self; 6] = [
        Self::READ,
        Self::WRITE,
        Self::LIST,
        Self::EXPORT,
        Self::IMPORT,
        Self::APPROVE,
    ];

    /// Wrap a raw value without checking it.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        Self::ALL.iter().any(|known| known.as_str() == self.as_str())
    }
}

impl core::fmt::Display for ActionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ActionType {
    type Err = AuthzError;

    /// Checked parse: unknown literals are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| AuthzError::InvalidAction(s.to_string()))
    }
}

/// Resource identifier (the noun half of a permission).
///
/// Same representation as [`ActionType`]: opaque on the wire, validated
/// against [`ResourceType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    // Identity and access.
    pub const USER: Self = Self(Cow::Borrowed("user"));
    pub const ROLE: Self = Self(Cow::Borrowed("role"));
    pub const PERMISSION: Self = Self(Cow::Borrowed("permission"));

    // Business records.
    pub const PRODUCT: Self = Self(Cow::Borrowed("product"));
    pub const ORDER: Self = Self(Cow::Borrowed("order"));
    pub const CUSTOMER: Self = Self(Cow::Borrowed("customer"));

    // System.
    pub const SYSTEM: Self = Self(Cow::Borrowed("system"));
    pub const LOG: Self = Self(Cow::Borrowed("log"));
    pub const REPORT: Self = Self(Cow::Borrowed("report"));
    pub const SETTING: Self = Self(Cow::Borrowed("setting"));

    /// The closed set of valid resources.
    pub const ALL: [Self; 10] = [
        Self::USER,
        Self::ROLE,
        Self::PERMISSION,
        Self::PRODUCT,
        Self::ORDER,
        Self::CUSTOMER,
        Self::SYSTEM,
        Self::LOG,
        Self::REPORT,
        Self::SETTING,
    ];

    /// Wrap a raw value without checking it.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        Self::ALL.iter().any(|known| known.as_str() == self.as_str())
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceType {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| AuthzError::InvalidResource(s.to_string()))
    }
}

/// A grant of one action on one resource type.
///
/// Duplicates inside a role are harmless; no uniqueness is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: ResourceType,
    pub action: ActionType,
    #[serde(default)]
    pub description: String,
}

impl Permission {
    pub fn new(resource: ResourceType, action: ActionType) -> Self {
        Self {
            resource,
            action,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check both halves against the vocabulary, resource first.
    pub fn validate(&self) -> Result<(), AuthzError> {
        if !self.resource.is_valid() {
            return Err(AuthzError::InvalidResource(self.resource.to_string()));
        }
        if !self.action.is_valid() {
            return Err(AuthzError::InvalidAction(self.action.to_string()));
        }
        Ok(())
    }

    /// Exact pair equality; the description is ignored.
    pub fn grants(&self, resource: &ResourceType, action: &ActionType) -> bool {
        &self.resource == resource && &self.action == action
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}
