use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{names_email, normalize_identifier, AccountModel};
use crate::shared::AppError;

/// Table layout used by the Postgres store, applied at startup
pub const ACCOUNTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    full_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    refresh_token TEXT,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
)
"#;

/// Trait for account repository operations
#[async_trait]
pub trait AccountRepository {
    async fn create_account(&self, account: &AccountModel) -> Result<(), AppError>;
    async fn find_by_id(&self, account_id: &str) -> Result<Option<AccountModel>, AppError>;

    /// Looks up an account by email when the identifier contains `@`, by username otherwise
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountModel>, AppError>;

    /// True if either value is already taken as a username or as an email
    async fn exists_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError>;

    /// Atomically replaces the stored refresh token, but only if it still equals `expected`.
    /// Returns false when another writer got there first; `Err` only for store failures
    async fn swap_refresh_token(
        &self,
        account_id: &str,
        expected: Option<&str>,
        new_token: Option<&str>,
    ) -> Result<bool, AppError>;

    /// Unconditionally clears the stored refresh token
    async fn clear_refresh_token(&self, account_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of AccountRepository for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, AccountModel>>,
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated accounts
    pub fn with_accounts(accounts: Vec<AccountModel>) -> Self {
        let account_map = accounts
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        Self {
            accounts: Mutex::new(account_map),
        }
    }

    /// Returns the current number of accounts in the repository
    pub fn account_count(&self) -> usize {
        self.lock().map(|accounts| accounts.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, AccountModel>>, AppError> {
        self.accounts
            .lock()
            .map_err(|_| AppError::DatabaseError("Account store lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self, account))]
    async fn create_account(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, username = %account.username, "Creating account in memory");

        let mut accounts = self.lock()?;
        let taken = accounts.values().any(|existing| {
            existing.id == account.id
                || identifier_taken(existing, &account.username)
                || identifier_taken(existing, &account.email)
        });
        if taken {
            warn!(account_id = %account.id, "Account already exists in memory");
            return Err(AppError::Conflict(
                "Account already exists with same username or email".to_string(),
            ));
        }
        accounts.insert(account.id.clone(), account.clone());

        debug!(account_id = %account.id, "Account created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, account_id: &str) -> Result<Option<AccountModel>, AppError> {
        let accounts = self.lock()?;
        let account = accounts.get(account_id).cloned();

        if account.is_none() {
            debug!(account_id = %account_id, "Account not found in memory");
        }
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountModel>, AppError> {
        let accounts = self.lock()?;
        Ok(accounts
            .values()
            .find(|account| account.matches_identifier(identifier))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn exists_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let username = normalize_identifier(username);
        let email = normalize_identifier(email);

        let accounts = self.lock()?;
        Ok(accounts.values().any(|account| {
            identifier_taken(account, &username) || identifier_taken(account, &email)
        }))
    }

    #[instrument(skip(self, expected, new_token))]
    async fn swap_refresh_token(
        &self,
        account_id: &str,
        expected: Option<&str>,
        new_token: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        if account.refresh_token.as_deref() != expected {
            warn!(account_id = %account_id, "Refresh token changed underneath swap");
            return Ok(false);
        }

        account.refresh_token = new_token.map(str::to_string);
        account.updated_at = Utc::now();

        debug!(account_id = %account_id, "Refresh token swapped in memory");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn clear_refresh_token(&self, account_id: &str) -> Result<(), AppError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        account.refresh_token = None;
        account.updated_at = Utc::now();

        debug!(account_id = %account_id, "Refresh token cleared in memory");
        Ok(())
    }
}

fn identifier_taken(account: &AccountModel, identifier: &str) -> bool {
    account.username == identifier || account.email == identifier
}

/// PostgreSQL implementation of account repository
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the accounts table if it is missing
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(ACCOUNTS_SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to apply accounts schema");
                AppError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, username, email, full_name, password_hash, refresh_token, created_at, updated_at";

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self, account))]
    async fn create_account(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, username = %account.username, "Creating account in database");

        sqlx::query(
            "INSERT INTO accounts (id, username, email, full_name, password_hash, refresh_token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(&account.password_hash)
        .bind(&account.refresh_token)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                "Account already exists with same username or email".to_string(),
            ),
            e => {
                warn!(error = %e, "Failed to create account in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        debug!(account_id = %account.id, "Account created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, account_id: &str) -> Result<Option<AccountModel>, AppError> {
        sqlx::query_as::<_, AccountModel>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, account_id = %account_id, "Failed to fetch account from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountModel>, AppError> {
        let identifier = normalize_identifier(identifier);
        let column = if names_email(&identifier) {
            "email"
        } else {
            "username"
        };

        sqlx::query_as::<_, AccountModel>(&format!(
            "SELECT {} FROM accounts WHERE {} = $1",
            ACCOUNT_COLUMNS, column
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to look up account by identifier");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn exists_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM accounts \
             WHERE username IN ($1, $2) OR email IN ($1, $2))",
        )
        .bind(normalize_identifier(username))
        .bind(normalize_identifier(email))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to check account uniqueness");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, expected, new_token))]
    async fn swap_refresh_token(
        &self,
        account_id: &str,
        expected: Option<&str>,
        new_token: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = $3, updated_at = $4 \
             WHERE id = $1 AND refresh_token IS NOT DISTINCT FROM $2",
        )
        .bind(account_id)
        .bind(expected)
        .bind(new_token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, account_id = %account_id, "Failed to swap refresh token");
            AppError::DatabaseError(e.to_string())
        })?;

        let swapped = result.rows_affected() == 1;
        if !swapped {
            warn!(account_id = %account_id, "Refresh token changed underneath swap");
        }
        Ok(swapped)
    }

    #[instrument(skip(self))]
    async fn clear_refresh_token(&self, account_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(account_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, account_id = %account_id, "Failed to clear refresh token");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(account_id = %account_id, "Account not found for refresh token clear");
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }
}
