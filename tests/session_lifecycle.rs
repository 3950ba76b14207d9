use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use catalogue_auth::api::AuthApi;
use catalogue_auth::errors::{AuthError, AuthResult};
use catalogue_auth::models::user::{Credentials, NewUser, TokenResponse, User, UserWithRole};
use catalogue_auth::store::{MemoryTokenStore, TokenStore};
use catalogue_auth::{AuthState, SessionManager};

/// Scripted auth service: login succeeds when a token is configured,
/// the identity fetch succeeds when the presented token matches.
struct FakeApi {
    token: Option<String>,
    identity: Mutex<Option<UserWithRole>>,
    registered: Mutex<Vec<NewUser>>,
}

impl FakeApi {
    fn new(token: Option<&str>, identity: Option<UserWithRole>) -> Self {
        Self {
            token: token.map(str::to_string),
            identity: Mutex::new(identity),
            registered: Mutex::new(Vec::new()),
        }
    }

    fn set_identity(&self, identity: Option<UserWithRole>) {
        *self.identity.lock().unwrap() = identity;
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> AuthResult<TokenResponse> {
        match &self.token {
            Some(token) => Ok(TokenResponse {
                access_token: token.clone(),
                token_type: "bearer".to_string(),
            }),
            None => Err(AuthError::credentials("Incorrect email or password")),
        }
    }

    async fn register(&self, new_user: &NewUser) -> AuthResult<User> {
        self.registered.lock().unwrap().push(new_user.clone());
        Ok(User {
            id: 42,
            email: new_user.email.clone(),
            nom: new_user.nom.clone(),
            prenom: new_user.prenom.clone(),
            role_id: 5,
            is_active: true,
            created_at: None,
            updated_at: None,
        })
    }

    async fn current_user(&self, token: &str) -> AuthResult<UserWithRole> {
        let identity = self.identity.lock().unwrap();
        match (&self.token, identity.as_ref()) {
            (Some(expected), Some(user)) if expected == token => Ok(user.clone()),
            _ => Err(AuthError::token("Could not validate credentials")),
        }
    }
}

fn admin_identity(permissions: &[&str]) -> UserWithRole {
    UserWithRole {
        user: User {
            id: 1,
            email: "admin@x.com".to_string(),
            nom: "Admin".to_string(),
            prenom: "Root".to_string(),
            role_id: 1,
            is_active: true,
            created_at: None,
            updated_at: None,
        },
        role_name: "admin".to_string(),
        role_display_name: "Administrator".to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

fn manager(api: Arc<FakeApi>, store: Arc<MemoryTokenStore>) -> SessionManager {
    SessionManager::new(api, store)
}

#[tokio::test]
async fn login_commits_session_and_persists_token() {
    let api = Arc::new(FakeApi::new(
        Some("tok-1"),
        Some(admin_identity(&["articles.read", "articles.update", "users.read"])),
    ));
    let store = Arc::new(MemoryTokenStore::new());
    let mut manager = manager(api, store.clone());

    manager.login("admin@x.com", "admin").await.unwrap();

    assert!(manager.is_authenticated());
    assert!(manager.has_permission("articles.read"));
    assert!(!manager.has_permission("articles.delete"));
    assert!(manager.has_role("admin"));
    assert!(!manager.has_role("viewer"));
    assert_eq!(store.load().unwrap(), Some("tok-1".to_string()));
}

#[tokio::test]
async fn without_session_every_check_is_false() {
    let api = Arc::new(FakeApi::new(None, None));
    let manager = manager(api, Arc::new(MemoryTokenStore::new()));

    assert!(!manager.is_authenticated());
    assert!(!manager.has_permission("articles.read"));
    assert!(!manager.has_any_permission(["articles.read", "users.read"]));
    assert!(!manager.has_role("admin"));
    assert!(manager.token().is_err());
}

#[tokio::test]
async fn credential_rejection_surfaces_server_detail() {
    let api = Arc::new(FakeApi::new(None, None));
    let mut manager = manager(api, Arc::new(MemoryTokenStore::new()));

    let err = manager.login("admin@x.com", "wrong").await.unwrap_err();

    assert!(matches!(err, AuthError::Credentials(_)));
    assert_eq!(err.detail(), "Incorrect email or password");
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
}

#[tokio::test]
async fn identity_fetch_failure_rolls_back_without_partial_commit() {
    // Credential exchange succeeds, /me rejects the token.
    let api = Arc::new(FakeApi::new(Some("tok-1"), None));
    let store = Arc::new(MemoryTokenStore::with_token("stale-token"));
    let mut manager = manager(api, store.clone());

    let err = manager.login("admin@x.com", "admin").await.unwrap_err();

    assert!(matches!(err, AuthError::Token(_)));
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
    assert!(!manager.is_authenticated());
    // No token may stay persisted without a validated identity.
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn logout_is_idempotent_for_state_and_storage() {
    let api = Arc::new(FakeApi::new(Some("tok-1"), Some(admin_identity(&["articles.read"]))));
    let store = Arc::new(MemoryTokenStore::new());
    let mut manager = manager(api, store.clone());

    manager.login("admin@x.com", "admin").await.unwrap();
    assert!(manager.is_authenticated());

    manager.logout().unwrap();
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
    assert_eq!(store.load().unwrap(), None);

    manager.logout().unwrap();
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn rehydration_restores_a_valid_persisted_token() {
    let api = Arc::new(FakeApi::new(Some("tok-1"), Some(admin_identity(&["articles.read"]))));
    let store = Arc::new(MemoryTokenStore::with_token("tok-1"));
    let mut manager = manager(api, store.clone());

    assert!(manager.load_persisted_session().await);
    assert!(manager.is_authenticated());
    assert!(manager.has_permission("articles.read"));
}

#[tokio::test]
async fn rejected_persisted_token_is_discarded() {
    // The server no longer accepts the stored token.
    let api = Arc::new(FakeApi::new(Some("tok-2"), Some(admin_identity(&[]))));
    let store = Arc::new(MemoryTokenStore::with_token("tok-1"));
    let mut manager = manager(api, store.clone());

    assert!(!manager.load_persisted_session().await);
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
    assert!(manager.session().is_none());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn rehydration_without_a_stored_token_is_a_quiet_no_op() {
    let api = Arc::new(FakeApi::new(Some("tok-1"), Some(admin_identity(&[]))));
    let mut manager = manager(api, Arc::new(MemoryTokenStore::new()));

    assert!(!manager.load_persisted_session().await);
    assert!(matches!(manager.state(), AuthState::Unauthenticated));
}

#[tokio::test]
async fn register_ends_authenticated_without_separate_login() {
    let api = Arc::new(FakeApi::new(Some("tok-1"), Some(admin_identity(&["articles.read"]))));
    let store = Arc::new(MemoryTokenStore::new());
    let mut manager = manager(api.clone(), store.clone());

    let new_user = NewUser {
        email: "new@x.com".to_string(),
        nom: "New".to_string(),
        prenom: "User".to_string(),
        password: "secret123".to_string(),
    };
    manager.register(&new_user).await.unwrap();

    assert!(manager.is_authenticated());
    assert_eq!(api.registered.lock().unwrap().len(), 1);
    assert_eq!(store.load().unwrap(), Some("tok-1".to_string()));
}

#[tokio::test]
async fn cached_permissions_are_a_snapshot_until_refetched() {
    let api = Arc::new(FakeApi::new(Some("tok-1"), Some(admin_identity(&["articles.read"]))));
    let store = Arc::new(MemoryTokenStore::new());
    let mut manager = manager(api.clone(), store);

    manager.login("admin@x.com", "admin").await.unwrap();
    assert!(manager.has_permission("articles.read"));

    // Role permissions change server-side after the session was issued.
    let mut downgraded = admin_identity(&[]);
    downgraded.permissions = HashSet::new();
    api.set_identity(Some(downgraded));

    // The committed session keeps answering from its snapshot.
    assert!(manager.has_permission("articles.read"));

    // A fresh identity fetch picks up the change.
    assert!(manager.load_persisted_session().await);
    assert!(!manager.has_permission("articles.read"));
}
