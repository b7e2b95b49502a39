// Public API - what other modules can use
pub use handlers::{current_user, register};
pub use models::{AccountModel, PublicAccount};
pub use repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};

// Internal modules
mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod types;
