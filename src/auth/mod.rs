// Public API - what other modules can use
pub use errors::AuthError;
pub use handlers::{login, logout, refresh_access_token};
pub use middleware::jwt_auth;
pub use service::SessionManager;
pub use types::{SessionResponse, TokenClaims, TokenPair};

// Internal modules
pub mod cookies;
mod errors;
mod handlers;
mod middleware;
pub mod service;
pub mod token;
mod types;
