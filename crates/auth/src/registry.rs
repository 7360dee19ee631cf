//! In-memory role registry and permission check.
//!
//! The registry is the single decision point for "may this role do X".
//! It is shared across request handlers behind a reader/writer lock: checks
//! and lookups run in parallel, mutations are exclusive. No I/O happens while
//! the lock is held.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::{ActionType, Permission, ResourceType, Role, RoleType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid resource type: {0}")]
    InvalidResource(String),

    #[error("invalid action type: {0}")]
    InvalidAction(String),

    #[error("role not found: {0}")]
    RoleNotFound(String),

    #[error("permission denied for role {role} to {action} {resource}")]
    PermissionDenied {
        role: String,
        action: String,
        resource: String,
    },
}

/// Name of the stock read-only role seeded by [`RoleRegistry::with_default_roles`].
pub const DEFAULT_USER_ROLE: &str = "defaultUser";

/// Name of the stock administrative role seeded by [`RoleRegistry::with_default_roles`].
pub const DEFAULT_ADMIN_ROLE: &str = "defaultAdmin";

/// Concurrency-safe mapping from role name to [`Role`].
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: RwLock<HashMap<String, Role>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with `defaultUser` and `defaultAdmin`.
    pub fn with_default_roles() -> Self {
        let roles = default_roles()
            .into_iter()
            .map(|role| (role.name.clone(), role))
            .collect();
        Self {
            roles: RwLock::new(roles),
        }
    }

    /// Insert or replace a role, all-or-nothing.
    ///
    /// Every permission is validated before the write lock is taken; the
    /// first invalid one is reported and the registry is left untouched.
    pub fn add_role(&self, role: Role) -> Result<(), AuthzError> {
        for permission in &role.permissions {
            permission.validate()?;
        }

        let name = role.name.clone();
        let permission_count = role.permissions.len();
        let replaced = self.roles.write().insert(name.clone(), role).is_some();

        tracing::debug!(role = %name, permissions = permission_count, replaced, "role registered");
        Ok(())
    }

    /// Remove a role. Removing an unknown role is a no-op.
    pub fn remove_role(&self, name: &str) {
        let removed = self.roles.write().remove(name).is_some();
        if removed {
            tracing::debug!(role = %name, "role removed");
        }
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.read().contains_key(name)
    }

    /// Copy of the role's permission list.
    ///
    /// The returned vector is owned by the caller; mutating it never
    /// affects the registry.
    pub fn role_permissions(&self, name: &str) -> Result<Vec<Permission>, AuthzError> {
        self.roles
            .read()
            .get(name)
            .map(|role| role.permissions.clone())
            .ok_or_else(|| AuthzError::RoleNotFound(name.to_string()))
    }

    /// Snapshot of a whole role definition.
    pub fn role(&self, name: &str) -> Option<Role> {
        self.roles.read().get(name).cloned()
    }

    /// Registered role names, sorted.
    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roles.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.roles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.read().is_empty()
    }

    /// Decide whether `role_name` may perform `action` on `resource`.
    ///
    /// Input is validated before the read lock is taken. Matching is an exact
    /// `(resource, action)` comparison over the role's own permissions: no
    /// wildcards, no hierarchy, no inheritance by role type.
    pub fn check_permission(
        &self,
        role_name: &str,
        resource: &ResourceType,
        action: &ActionType,
    ) -> Result<(), AuthzError> {
        if !resource.is_valid() {
            return Err(AuthzError::InvalidResource(resource.to_string()));
        }
        if !action.is_valid() {
            return Err(AuthzError::InvalidAction(action.to_string()));
        }

        let roles = self.roles.read();
        let role = roles
            .get(role_name)
            .ok_or_else(|| AuthzError::RoleNotFound(role_name.to_string()))?;

        if role.permissions.iter().any(|p| p.grants(resource, action)) {
            Ok(())
        } else {
            Err(AuthzError::PermissionDenied {
                role: role_name.to_string(),
                action: action.to_string(),
                resource: resource.to_string(),
            })
        }
    }
}

fn default_roles() -> [Role; 2] {
    [
        Role::new(DEFAULT_USER_ROLE, RoleType::User)
            .with_description("Basic user with read-only catalog access")
            .with_permission(Permission::new(ResourceType::PRODUCT, ActionType::READ)),
        Role::new(DEFAULT_ADMIN_ROLE, RoleType::Admin)
            .with_description("Administrator managing products and users")
            .with_permissions([
                Permission::new(ResourceType::PRODUCT, ActionType::WRITE),
                Permission::new(ResourceType::USER, ActionType::WRITE),
            ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use proptest::prelude::*;

    fn admin_registry() -> RoleRegistry {
        let registry = RoleRegistry::new();
        registry
            .add_role(
                Role::new("defaultAdmin", RoleType::Admin).with_permissions([
                    Permission::new(ResourceType::PRODUCT, ActionType::WRITE),
                    Permission::new(ResourceType::USER, ActionType::WRITE),
                ]),
            )
            .unwrap();
        registry
    }

    #[test]
    fn check_grants_listed_pair() {
        let registry = admin_registry();
        assert_eq!(
            registry.check_permission("defaultAdmin", &ResourceType::PRODUCT, &ActionType::WRITE),
            Ok(())
        );
    }

    #[test]
    fn check_denies_unlisted_pair() {
        let registry = admin_registry();
        let err = registry
            .check_permission("defaultAdmin", &ResourceType::USER, &ActionType::READ)
            .unwrap_err();

        assert_eq!(
            err,
            AuthzError::PermissionDenied {
                role: "defaultAdmin".to_string(),
                action: "read".to_string(),
                resource: "user".to_string(),
            }
        );
        assert_eq!(err.to_string(), "permission denied for role defaultAdmin to read user");
    }

    #[test]
    fn check_unknown_role() {
        let registry = admin_registry();
        assert_eq!(
            registry.check_permission("ghost", &ResourceType::PRODUCT, &ActionType::WRITE),
            Err(AuthzError::RoleNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn check_rejects_invalid_input_before_role_lookup() {
        let registry = RoleRegistry::new();
        assert_eq!(
            registry.check_permission("ghost", &ResourceType::new("rocket"), &ActionType::READ),
            Err(AuthzError::InvalidResource("rocket".to_string()))
        );
        assert_eq!(
            registry.check_permission("ghost", &ResourceType::ORDER, &ActionType::new("launch")),
            Err(AuthzError::InvalidAction("launch".to_string()))
        );
    }

    #[test]
    fn add_role_with_invalid_permission_does_not_mutate() {
        let registry = admin_registry();
        let before = registry.role_permissions("defaultAdmin").unwrap();

        let bad = Role::new("defaultAdmin", RoleType::Admin).with_permissions([
            Permission::new(ResourceType::LOG, ActionType::READ),
            Permission::new(ResourceType::LOG, ActionType::new("shred")),
        ]);
        assert_eq!(
            registry.add_role(bad),
            Err(AuthzError::InvalidAction("shred".to_string()))
        );
        assert_eq!(registry.role_permissions("defaultAdmin").unwrap(), before);

        let fresh = Role::new("intruder", RoleType::User)
            .with_permission(Permission::new(ResourceType::new("vault"), ActionType::READ));
        assert!(registry.add_role(fresh).is_err());
        assert!(!registry.has_role("intruder"));
    }

    #[test]
    fn add_role_overwrites_whole_entry() {
        let registry = admin_registry();
        registry
            .add_role(
                Role::new("defaultAdmin", RoleType::Admin)
                    .with_permission(Permission::new(ResourceType::REPORT, ActionType::EXPORT)),
            )
            .unwrap();

        assert_eq!(
            registry.role_permissions("defaultAdmin").unwrap(),
            vec![Permission::new(ResourceType::REPORT, ActionType::EXPORT)]
        );
        assert!(
            registry
                .check_permission("defaultAdmin", &ResourceType::PRODUCT, &ActionType::WRITE)
                .is_err()
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn permissions_are_keyed_by_name_not_type() {
        let registry = admin_registry();
        registry
            .add_role(Role::new("juniorAdmin", RoleType::Admin))
            .unwrap();

        assert!(matches!(
            registry.check_permission("juniorAdmin", &ResourceType::PRODUCT, &ActionType::WRITE),
            Err(AuthzError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn remove_role_is_idempotent() {
        let registry = admin_registry();
        registry.remove_role("defaultAdmin");
        registry.remove_role("defaultAdmin");
        assert!(!registry.has_role("defaultAdmin"));
        assert!(registry.is_empty());
    }

    #[test]
    fn role_permissions_returns_defensive_copy() {
        let registry = admin_registry();

        let mut copy = registry.role_permissions("defaultAdmin").unwrap();
        copy.clear();
        copy.push(Permission::new(ResourceType::SYSTEM, ActionType::APPROVE));

        assert_eq!(registry.role_permissions("defaultAdmin").unwrap().len(), 2);
        assert!(
            registry
                .check_permission("defaultAdmin", &ResourceType::SYSTEM, &ActionType::APPROVE)
                .is_err()
        );
        assert_eq!(
            registry.role_permissions("ghost"),
            Err(AuthzError::RoleNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn default_roles_are_seeded() {
        let registry = RoleRegistry::with_default_roles();
        assert_eq!(registry.role_names(), ["defaultAdmin", "defaultUser"]);
        assert!(
            registry
                .check_permission(DEFAULT_USER_ROLE, &ResourceType::PRODUCT, &ActionType::READ)
                .is_ok()
        );
        assert!(
            registry
                .check_permission(DEFAULT_USER_ROLE, &ResourceType::PRODUCT, &ActionType::WRITE)
                .is_err()
        );
        assert_eq!(
            registry.role(DEFAULT_ADMIN_ROLE).map(|r| r.role_type),
            Some(RoleType::Admin)
        );
    }

    #[test]
    fn concurrent_checks_and_writes() {
        let registry = Arc::new(RoleRegistry::with_default_roles());
        let mut handles = Vec::new();

        for i in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for n in 0..200 {
                    if i % 4 == 0 {
                        let name = format!("temp-{i}-{n}");
                        registry
                            .add_role(
                                Role::new(name.clone(), RoleType::User)
                                    .with_permission(Permission::new(ResourceType::LOG, ActionType::LIST)),
                            )
                            .unwrap();
                        registry.remove_role(&name);
                    } else {
                        // Stock roles are never touched by the writers.
                        assert!(
                            registry
                                .check_permission(
                                    DEFAULT_ADMIN_ROLE,
                                    &ResourceType::USER,
                                    &ActionType::WRITE
                                )
                                .is_ok()
                        );
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 2);
    }

    fn valid_permission() -> impl Strategy<Value = Permission> {
        (0..ResourceType::ALL.len(), 0..ActionType::ALL.len()).prop_map(|(r, a)| {
            Permission::new(ResourceType::ALL[r].clone(), ActionType::ALL[a].clone())
        })
    }

    proptest! {
        #[test]
        fn check_agrees_with_membership(
            perms in proptest::collection::vec(valid_permission(), 0..12),
            probe in valid_permission(),
        ) {
            let registry = RoleRegistry::new();
            registry.add_role(Role::new("r", RoleType::User).with_permissions(perms.clone())).unwrap();

            for p in &perms {
                prop_assert!(registry.check_permission("r", &p.resource, &p.action).is_ok());
            }

            let granted = perms.iter().any(|p| p.grants(&probe.resource, &probe.action));
            let result = registry.check_permission("r", &probe.resource, &probe.action);
            if granted {
                prop_assert!(result.is_ok());
            } else {
                let is_denied = matches!(result, Err(AuthzError::PermissionDenied { .. }));
                prop_assert!(is_denied);
            }
        }

        #[test]
        fn invalid_resources_never_register(raw in "[a-z]{1,10}") {
            let resource = ResourceType::new(raw);
            prop_assume!(!resource.is_valid());

            let registry = RoleRegistry::new();
            let role = Role::new("r", RoleType::User)
                .with_permission(Permission::new(resource, ActionType::READ));

            prop_assert!(!registry.has_role("r"));
            let is_invalid = matches!(registry.add_role(role), Err(AuthzError::InvalidResource(_)));
            prop_assert!(is_invalid);
            prop_assert!(!registry.has_role("r"));
        }
    }
}
