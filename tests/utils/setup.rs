#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use authgate::{
    account::{models::AccountModel, password::hash_password},
    routes, AppState, AuthConfig, InMemoryAccountRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const PASSWORD: &str = "hunter22";

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub repository: Arc<InMemoryAccountRepository>,
    pub accounts: Vec<AccountModel>,
}

pub struct TestSetupBuilder {
    usernames: Vec<String>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            usernames: vec![],
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(10),
        }
    }

    /// Pre-registers accounts named `<username>` / `<username>@example.com`, all with PASSWORD
    pub fn with_accounts(mut self, usernames: Vec<&str>) -> Self {
        self.usernames = usernames.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_alice(self) -> Self {
        self.with_accounts(vec!["alice"])
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn build(self) -> TestSetup {
        let accounts: Vec<AccountModel> = self
            .usernames
            .iter()
            .map(|username| {
                AccountModel::new(
                    username,
                    &format!("{}@example.com", username),
                    "Test User",
                    hash_password(PASSWORD).unwrap(),
                )
            })
            .collect();

        let repository = Arc::new(InMemoryAccountRepository::with_accounts(accounts.clone()));
        let config = AuthConfig::new(
            "integration-access-secret",
            self.access_token_ttl,
            "integration-refresh-secret",
            self.refresh_token_ttl,
        )
        .unwrap()
        .with_secure_cookies(false);

        let state = AppState::new(repository.clone(), config);
        let app = routes::router(state.clone());

        TestSetup {
            app,
            state,
            repository,
            accounts,
        }
    }
}
