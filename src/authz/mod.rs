//! Authorization core: the in-memory session and the pure evaluator
//! answering `has_permission` / `has_any_permission` / `has_role`
//! against it.
//!
//! Checks are flat set membership over the permission names flattened
//! into the identity payload at login time. There is no role hierarchy,
//! no negation and no attribute scoping; an unknown permission name
//! simply evaluates to not-granted.

mod registry;
mod session;

pub use registry::PermissionRegistry;
pub use session::Session;

/// Roles that must never be deletable through the management interface.
pub const SYSTEM_ROLES: [&str; 2] = [roles::SUPER_ADMIN, roles::ADMIN];

pub fn is_system_role(name: &str) -> bool {
    SYSTEM_ROLES.contains(&name)
}

/// Well-known role names
pub mod roles {
    pub const SUPER_ADMIN: &str = "super_admin";
    pub const ADMIN: &str = "admin";
    pub const EDITOR: &str = "editor";
    pub const VIEWER: &str = "viewer";
}

/// Well-known permission names
pub mod permissions {
    // Articles
    pub const ARTICLES_READ: &str = "articles.read";
    pub const ARTICLES_CREATE: &str = "articles.create";
    pub const ARTICLES_UPDATE: &str = "articles.update";
    pub const ARTICLES_DELETE: &str = "articles.delete";

    // Categories
    pub const CATEGORIES_READ: &str = "categories.read";
    pub const CATEGORIES_CREATE: &str = "categories.create";
    pub const CATEGORIES_UPDATE: &str = "categories.update";
    pub const CATEGORIES_DELETE: &str = "categories.delete";

    // Sub-categories
    pub const SOUS_CATEGORIES_READ: &str = "sous_categories.read";
    pub const SOUS_CATEGORIES_CREATE: &str = "sous_categories.create";
    pub const SOUS_CATEGORIES_UPDATE: &str = "sous_categories.update";
    pub const SOUS_CATEGORIES_DELETE: &str = "sous_categories.delete";

    // Users
    pub const USERS_READ: &str = "users.read";
    pub const USERS_UPDATE: &str = "users.update";
    pub const USERS_DELETE: &str = "users.delete";

    // Roles
    pub const ROLES_READ: &str = "roles.read";
    pub const ROLES_CREATE: &str = "roles.create";
    pub const ROLES_UPDATE: &str = "roles.update";
    pub const ROLES_DELETE: &str = "roles.delete";
}
