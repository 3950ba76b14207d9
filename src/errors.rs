pub type AuthResult<T> = Result<T, AuthError>;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// Wrong email/password or deactivated account; carries the server's
    /// `detail` message verbatim.
    #[error("invalid credentials: {0}")]
    Credentials(String),
    /// Bearer token rejected by the identity endpoint (expired, revoked,
    /// forged).
    #[error("token rejected: {0}")]
    Token(String),
    #[error("api error ({status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("network error")]
    Network(#[from] reqwest::Error),
    #[error("token storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    pub fn token(message: impl Into<String>) -> Self {
        Self::Token(message.into())
    }

    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Human-readable failure reason for display, mirroring the server's
    /// error envelope where one was received.
    pub fn detail(&self) -> String {
        match self {
            AuthError::Credentials(detail) | AuthError::Token(detail) => detail.clone(),
            AuthError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}
