use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::errors::{AuthError, AuthResult};

/// Durable home of the bearer token between runs. Only the session
/// manager writes to it; everything else reads the in-memory session.
pub trait TokenStore: Send + Sync {
    /// The persisted token, if any. Contents are untrusted: the caller
    /// must validate against the identity endpoint before use.
    fn load(&self) -> AuthResult<Option<String>>;
    fn save(&self, token: &str) -> AuthResult<()>;
    /// Idempotent; clearing an empty store is a no-op.
    fn clear(&self) -> AuthResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Token persisted as a small JSON file at a well-known path.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.token_path.clone())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> AuthResult<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // A malformed file is treated as no token rather than an error;
        // rehydration re-validates against the server anyway.
        match serde_json::from_str::<StoredToken>(&raw) {
            Ok(stored) => Ok(Some(stored.token)),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "discarding unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let raw = serde_json::to_string(&stored)
            .map_err(|err| AuthError::storage(format!("failed to encode token: {err}")))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> AuthResult<Option<String>> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> AuthResult<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
