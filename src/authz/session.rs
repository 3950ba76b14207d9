use crate::models::user::UserWithRole;

/// The authenticated principal: identity plus the bearer token it was
/// resolved from.
///
/// A session is committed and replaced as a whole by the
/// [`SessionManager`](crate::session::SessionManager); everything else
/// only reads it. The permission set is a snapshot taken at identity
/// fetch, not a live join — server-side role changes are invisible
/// until the next fetch.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserWithRole,
    pub token: String,
}

impl Session {
    pub fn new(user: UserWithRole, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Flat set membership over the flattened permission names. Unknown
    /// names are simply not members, so they evaluate to `false`.
    pub fn has_permission(&self, permission: &str) -> bool {
        let granted = self.user.permissions.contains(permission);
        tracing::debug!(
            user_id = self.user.user.id,
            permission = %permission,
            granted,
            "permission check"
        );
        granted
    }

    /// True if at least one of the names is granted; empty input is `false`.
    pub fn has_any_permission<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        permissions
            .into_iter()
            .any(|permission| self.has_permission(permission.as_ref()))
    }

    /// Exact, case-sensitive role comparison. No hierarchy: `admin` does
    /// not satisfy a check for `viewer`.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.user.role_name == role_name
    }
}
