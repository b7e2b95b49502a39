use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{AccountModel, PublicAccount},
    password::spawn_hash_password,
    repository::AccountRepository,
    types::RegisterRequest,
};
use crate::shared::AppError;

/// Service for account registration
pub struct AccountService {
    repository: Arc<dyn AccountRepository + Send + Sync>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn AccountRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a new account after checking username and email are free
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<PublicAccount, AppError> {
        request.validate()?;

        if self
            .repository
            .exists_with_username_or_email(&request.username, &request.email)
            .await?
        {
            warn!("Registration rejected, username or email taken");
            return Err(AppError::Conflict(
                "Account already exists with same username or email".to_string(),
            ));
        }

        let password_hash = spawn_hash_password(request.password.clone()).await?;
        let account = AccountModel::new(
            &request.username,
            &request.email,
            &request.full_name,
            password_hash,
        );

        // The store enforces uniqueness again, covering registrations that race past the check
        self.repository.create_account(&account).await?;

        info!(account_id = %account.id, "Account registered");
        Ok(account.to_public())
    }
}
