use std::collections::BTreeSet;

use crate::models::rbac::{Permission, RolePermissionCatalog, RoleWithPermissions};

/// Read-only view over the backend-seeded permission vocabulary and the
/// roles defined on it. Built from a fetched catalog; never mutated here.
/// Uniqueness of permission names is the backend's invariant.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    roles: Vec<RoleWithPermissions>,
    permissions: Vec<Permission>,
}

impl PermissionRegistry {
    pub fn new(catalog: RolePermissionCatalog) -> Self {
        Self {
            roles: catalog.roles,
            permissions: catalog.permissions,
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn roles(&self) -> &[RoleWithPermissions] {
        &self.roles
    }

    /// Whether `name` is part of the vocabulary the evaluator may be
    /// asked about. Useful to distinguish a typo from a denial, which
    /// the evaluator itself deliberately does not do.
    pub fn knows(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }

    /// Distinct resources, sorted, for grouped display.
    pub fn resources(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.permissions.iter().map(|p| p.resource.as_str()).collect();
        set.into_iter().collect()
    }

    pub fn by_resource(&self, resource: &str) -> Vec<&Permission> {
        self.permissions.iter().filter(|p| p.resource == resource).collect()
    }

    pub fn role(&self, name: &str) -> Option<&RoleWithPermissions> {
        self.roles.iter().find(|r| r.role.name == name)
    }
}
