// Library crate for the account authentication service
// This file exposes the public API for integration tests

pub mod account;
pub mod auth;
pub mod config;
pub mod routes;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use account::{AccountModel, AccountRepository, InMemoryAccountRepository, PublicAccount};
pub use auth::{AuthError, SessionManager, TokenPair};
pub use config::{AuthConfig, Config};
pub use shared::{ApiResponse, AppError, AppState};
