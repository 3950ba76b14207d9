use std::sync::Arc;

use crate::api::AuthApi;
use crate::authz::Session;
use crate::errors::{AuthError, AuthResult};
use crate::models::user::{Credentials, NewUser};
use crate::store::TokenStore;

/// Lifecycle state of the current principal.
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(Session),
}

/// Owns the session: establishes it (credentials, then token, then
/// identity fetch), persists the token across runs and tears it down.
/// All mutation goes through `login` / `register` / `logout` /
/// `load_persisted_session`, which replace or clear the session as a
/// whole unit — there is no intermediate state where a token is visible
/// without its matching identity.
///
/// Lifecycle operations take `&mut self`, so one operation completes
/// (commit or full rollback) before the next can start; reads through
/// [`session`](Self::session) and the permission checks always observe
/// the last committed value.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    state: AuthState,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// The last committed session, if any.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    // -------------------------------------------------------------------
    // Evaluator access: plain booleans, never failing. Without a session
    // every check answers `false`.
    // -------------------------------------------------------------------

    pub fn has_permission(&self, permission: &str) -> bool {
        self.session().is_some_and(|s| s.has_permission(permission))
    }

    pub fn has_any_permission<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session().is_some_and(|s| s.has_any_permission(permissions))
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.session().is_some_and(|s| s.has_role(role_name))
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Exchange credentials for a token, resolve the token into the full
    /// identity, persist the token and commit the session — in that
    /// order. Any failure rolls the whole thing back: state returns to
    /// `Unauthenticated` and no token stays persisted without a
    /// validated identity.
    pub async fn login(&mut self, email: &str, password: &str) -> AuthResult<()> {
        self.state = AuthState::Authenticating;
        let credentials = Credentials::new(email, password);

        match self.establish(&credentials).await {
            Ok(session) => {
                tracing::info!(email, role = %session.user.role_name, "login succeeded");
                self.state = AuthState::Authenticated(session);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(email, reason = %err.detail(), "login failed");
                self.state = AuthState::Unauthenticated;
                if let Err(clear_err) = self.store.clear() {
                    tracing::warn!(%clear_err, "failed to clear persisted token after rollback");
                }
                Err(err)
            }
        }
    }

    async fn establish(&self, credentials: &Credentials) -> AuthResult<Session> {
        let token = self.api.login(credentials).await?;
        let user = self.api.current_user(&token.access_token).await?;
        self.store.save(&token.access_token)?;
        Ok(Session::new(user, token.access_token))
    }

    /// Create the account, then run the login flow with the same
    /// credentials. Success always ends authenticated; there is no
    /// separate "please log in" step.
    pub async fn register(&mut self, new_user: &NewUser) -> AuthResult<()> {
        self.api.register(new_user).await?;
        self.login(&new_user.email, &new_user.password).await
    }

    /// Drop the in-memory session and the persisted token. Idempotent:
    /// logging out while unauthenticated is a no-op. The in-memory
    /// session is cleared even if removing the persisted token fails.
    pub fn logout(&mut self) -> AuthResult<()> {
        self.state = AuthState::Unauthenticated;
        self.store.clear()
    }

    /// Startup rehydration: a persisted token only becomes a session
    /// after the identity endpoint confirms it. On any failure path
    /// (missing, expired, revoked, network error, unreadable storage)
    /// the token is discarded and the manager lands in
    /// `Unauthenticated`. Returns whether a session was restored.
    pub async fn load_persisted_session(&mut self) -> bool {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.state = AuthState::Unauthenticated;
                return false;
            }
            Err(err) => {
                tracing::warn!(reason = %err.detail(), "token storage unreadable; starting unauthenticated");
                self.state = AuthState::Unauthenticated;
                return false;
            }
        };

        self.state = AuthState::Authenticating;
        match self.api.current_user(&token).await {
            Ok(user) => {
                tracing::info!(role = %user.role_name, "restored session from persisted token");
                self.state = AuthState::Authenticated(Session::new(user, token));
                true
            }
            Err(err) => {
                tracing::warn!(reason = %err.detail(), "persisted token rejected; discarding");
                self.state = AuthState::Unauthenticated;
                if let Err(clear_err) = self.store.clear() {
                    tracing::warn!(%clear_err, "failed to remove rejected token");
                }
                false
            }
        }
    }

    /// Bearer token of the current session, for privileged API calls.
    pub fn token(&self) -> AuthResult<&str> {
        self.session()
            .map(|session| session.token.as_str())
            .ok_or_else(|| AuthError::token("not authenticated"))
    }
}
