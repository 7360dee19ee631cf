use serde::{Deserialize, Serialize};

use crate::Permission;

/// Coarse classification of a role.
///
/// Descriptive metadata only: authorization is always decided by role
/// *name* through the registry, never by comparing role types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Admin,
    #[default]
    User,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "admin",
            RoleType::User => "user",
        }
    }
}

impl core::fmt::Display for RoleType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named role with its ordered permission list.
///
/// The identity key is `name`; several roles may share a `role_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: RoleType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: impl Into<String>, role_type: RoleType) -> Self {
        Self {
            name: name.into(),
            role_type,
            description: String::new(),
            permissions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionType, ResourceType};

    #[test]
    fn role_round_trips_through_wire_shape() {
        let json = r#"{
            "name": "auditor",
            "type": "user",
            "permissions": [{"resource": "log", "action": "read", "description": "read logs"}]
        }"#;

        let role: Role = serde_json::from_str(json).unwrap();
        assert_eq!(role.name, "auditor");
        assert_eq!(role.role_type, RoleType::User);
        assert!(role.description.is_empty());
        assert_eq!(
            role.permissions,
            vec![Permission::new(ResourceType::LOG, ActionType::READ).with_description("read logs")]
        );
    }

    #[test]
    fn unknown_role_type_is_rejected_at_the_boundary() {
        let json = r#"{"name": "x", "type": "superuser"}"#;
        assert!(serde_json::from_str::<Role>(json).is_err());
    }

    #[test]
    fn builder_preserves_permission_order() {
        let role = Role::new("ops", RoleType::Admin)
            .with_permission(Permission::new(ResourceType::SYSTEM, ActionType::WRITE))
            .with_permissions([
                Permission::new(ResourceType::LOG, ActionType::EXPORT),
                Permission::new(ResourceType::SYSTEM, ActionType::WRITE),
            ]);

        let pairs: Vec<String> = role.permissions.iter().map(ToString::to_string).collect();
        assert_eq!(pairs, ["system:write", "log:export", "system:write"]);
        assert_eq!(role.role_type.to_string(), "admin");
    }
}
