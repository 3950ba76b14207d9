use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::errors::{AuthError, AuthResult};
use crate::models::rbac::{
    NewRole, PermissionCheck, PermissionCheckResponse, RolePermissionCatalog, RoleUpdate,
    RoleWithPermissions,
};
use crate::models::user::{Credentials, NewUser, TokenResponse, User, UserUpdate, UserWithRole};

/// The slice of the auth service the session lifecycle depends on.
/// Kept behind a trait so the manager can be driven by a fake in tests.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`: exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> AuthResult<TokenResponse>;
    /// `POST /auth/register`: create the user record. The backend assigns
    /// the non-privileged default role.
    async fn register(&self, new_user: &NewUser) -> AuthResult<User>;
    /// `GET /auth/me`: resolve a bearer token into the full identity,
    /// permissions flattened.
    async fn current_user(&self, token: &str) -> AuthResult<UserWithRole>;
}

/// reqwest-backed client for the catalogue API: the [`AuthApi`] surface
/// plus the user/role administration endpoints. All administration calls
/// require a bearer token; the server independently enforces the matching
/// permission and answers 403 when it is missing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Decode a success body, or surface the server's `detail` message.
    async fn parse<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::into_api_error(status, response).await)
    }

    async fn into_api_error(status: StatusCode, response: Response) -> AuthError {
        let detail = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.detail,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        AuthError::api(status.as_u16(), detail)
    }

    // -------------------------------------------------------------------
    // User administration (requires `users.*` server-side)
    // -------------------------------------------------------------------

    pub async fn list_users(&self, token: &str) -> AuthResult<Vec<UserWithRole>> {
        let response = self.bearer(self.http.get(self.url("/auth/users")), token).send().await?;
        Self::parse(response).await
    }

    pub async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        update: &UserUpdate,
    ) -> AuthResult<UserWithRole> {
        let url = self.url(&format!("/auth/users/{user_id}"));
        let response = self.bearer(self.http.put(url), token).json(update).send().await?;
        Self::parse(response).await
    }

    pub async fn delete_user(&self, token: &str, user_id: i64) -> AuthResult<MessageResponse> {
        let url = self.url(&format!("/auth/users/{user_id}"));
        let response = self.bearer(self.http.delete(url), token).send().await?;
        Self::parse(response).await
    }

    // -------------------------------------------------------------------
    // Role administration (requires `roles.*` server-side)
    // -------------------------------------------------------------------

    pub async fn roles_and_permissions(&self, token: &str) -> AuthResult<RolePermissionCatalog> {
        let response = self.bearer(self.http.get(self.url("/auth/roles")), token).send().await?;
        Self::parse(response).await
    }

    pub async fn create_role(&self, token: &str, role: &NewRole) -> AuthResult<RoleWithPermissions> {
        let response = self
            .bearer(self.http.post(self.url("/auth/roles")), token)
            .json(role)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn update_role(
        &self,
        token: &str,
        role_id: i64,
        update: &RoleUpdate,
    ) -> AuthResult<RoleWithPermissions> {
        let url = self.url(&format!("/auth/roles/{role_id}"));
        let response = self.bearer(self.http.put(url), token).json(update).send().await?;
        Self::parse(response).await
    }

    /// Deletion of the system-protected roles is rejected server-side;
    /// callers that know the role name should refuse earlier via
    /// [`crate::authz::is_system_role`].
    pub async fn delete_role(&self, token: &str, role_id: i64) -> AuthResult<MessageResponse> {
        let url = self.url(&format!("/auth/roles/{role_id}"));
        let response = self.bearer(self.http.delete(url), token).send().await?;
        Self::parse(response).await
    }

    /// `POST /auth/check-permission`: server-side mirror of the local
    /// evaluator, for defense in depth.
    pub async fn check_permission(
        &self,
        token: &str,
        check: &PermissionCheck,
    ) -> AuthResult<PermissionCheckResponse> {
        let response = self
            .bearer(self.http.post(self.url("/auth/check-permission")), token)
            .json(check)
            .send()
            .await?;
        Self::parse(response).await
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> AuthResult<TokenResponse> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let err = Self::into_api_error(status, response).await;
            return Err(AuthError::credentials(err.detail()));
        }
        Self::parse(response).await
    }

    async fn register(&self, new_user: &NewUser) -> AuthResult<User> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(new_user)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn current_user(&self, token: &str) -> AuthResult<UserWithRole> {
        let response = self.bearer(self.http.get(self.url("/auth/me")), token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let err = Self::into_api_error(status, response).await;
            return Err(AuthError::token(err.detail()));
        }
        Self::parse(response).await
    }
}
