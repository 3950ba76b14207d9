pub mod api;
pub mod authz;
pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod store;

// Re-export commonly used items for consumers
pub use api::{AuthApi, HttpClient};
pub use authz::Session;
pub use config::ClientConfig;
pub use errors::{AuthError, AuthResult};
pub use session::{AuthState, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
