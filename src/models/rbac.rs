use serde::{Deserialize, Serialize};

// =============================================================================
// PERMISSION
// =============================================================================

/// An atomic capability of the form `resource.action`. Permissions are
/// seeded by the backend and immutable from the client's point of view;
/// `name` is the only key the evaluator compares against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub resource: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub permission_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_ids: Option<Vec<i64>>,
}

// =============================================================================
// CATALOG (roles + full permission vocabulary)
// =============================================================================

/// Response of `GET /auth/roles`: every role with its permissions, plus
/// the complete permission vocabulary for role-editing UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissionCatalog {
    pub roles: Vec<RoleWithPermissions>,
    pub permissions: Vec<Permission>,
}

// =============================================================================
// SERVER-SIDE PERMISSION CHECK
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub has_permission: bool,
    pub message: String,
}
