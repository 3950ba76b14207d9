use std::path::PathBuf;

use crate::errors::AuthError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const TOKEN_FILE_NAME: &str = "auth_token";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the catalogue API, without a trailing slash.
    pub base_url: String,
    /// Path of the persisted bearer token file.
    pub token_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, AuthError> {
        let base_url = std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let token_path = match std::env::var("AUTH_TOKEN_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let home = std::env::var("HOME")
                    .map_err(|_| AuthError::configuration("AUTH_TOKEN_FILE not set and HOME unavailable"))?;
                PathBuf::from(home).join(".catalogue").join(TOKEN_FILE_NAME)
            }
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_path,
        })
    }
}
