use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{errors::AuthError, token::TokenCodec, types::TokenPair};
use crate::{
    account::{
        models::{AccountModel, PublicAccount},
        password::spawn_verify_password,
        repository::AccountRepository,
    },
    config::AuthConfig,
};

/// Owns credential verification and the access/refresh token lifecycle.
///
/// Each account holds at most one live refresh token. Every write of that token is a
/// compare-and-swap against the value the writer last observed, so concurrent rotations
/// of the same token cannot both succeed.
pub struct SessionManager {
    repository: Arc<dyn AccountRepository + Send + Sync>,
    access_tokens: TokenCodec,
    refresh_tokens: TokenCodec,
}

impl SessionManager {
    pub fn new(repository: Arc<dyn AccountRepository + Send + Sync>, config: &AuthConfig) -> Self {
        Self {
            repository,
            access_tokens: TokenCodec::new(&config.access_token_secret, config.access_token_ttl),
            refresh_tokens: TokenCodec::new(&config.refresh_token_secret, config.refresh_token_ttl),
        }
    }

    /// Finds the account by username or email and checks the password
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AccountModel, AuthError> {
        let account = self.repository.find_by_username_or_email(identifier).await?;
        let stored_hash = account.as_ref().map(|account| account.password_hash.clone());
        let verified = spawn_verify_password(password.to_string(), stored_hash).await?;

        let Some(account) = account else {
            debug!("No account matches identifier");
            return Err(AuthError::NotFound);
        };

        if !verified {
            warn!(account_id = %account.id, "Password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(account_id = %account.id, "Credentials verified");
        Ok(account)
    }

    /// Signs a new pair and stores the refresh token over the one `account` was read with
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub async fn issue_token_pair(&self, account: &AccountModel) -> Result<TokenPair, AuthError> {
        let pair = self.sign_pair(&account.id)?;

        let stored = self
            .repository
            .swap_refresh_token(
                &account.id,
                account.refresh_token.as_deref(),
                Some(&pair.refresh_token),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist refresh token");
                AuthError::TokenIssuanceFailed
            })?;

        if !stored {
            warn!("Session changed concurrently, tokens not issued");
            return Err(AuthError::TokenIssuanceFailed);
        }

        info!("Issued new token pair");
        Ok(pair)
    }

    /// Verifies credentials and opens a session
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(PublicAccount, TokenPair), AuthError> {
        let account = self.verify_credentials(identifier, password).await?;
        let pair = self.issue_token_pair(&account).await?;

        info!(account_id = %account.id, "Login successful");
        Ok((account.to_public(), pair))
    }

    /// Exchanges the current refresh token for a new pair.
    ///
    /// A validly signed token that no longer matches the stored one is treated as a replay:
    /// the stored token is cleared and the account must log in again.
    #[instrument(skip(self, presented))]
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let claims = self.refresh_tokens.verify(presented)?;

        let account = self
            .repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(account_id = %claims.sub, "Refresh token names unknown account");
                AuthError::InvalidToken
            })?;

        match account.refresh_token.as_deref() {
            Some(stored) if tokens_match(stored, presented) => {}
            Some(stored) => {
                warn!(account_id = %account.id, "Superseded refresh token presented, ending session");
                // Only clear the token we saw; a newer rotation must not be wiped by a stale replay
                match self
                    .repository
                    .swap_refresh_token(&account.id, Some(stored), None)
                    .await
                {
                    Ok(true) => info!(account_id = %account.id, "Session ended after token reuse"),
                    Ok(false) => {
                        warn!(account_id = %account.id, "Session moved on before it could be ended")
                    }
                    Err(e) => {
                        error!(error = %e, account_id = %account.id, "Failed to end session after token reuse")
                    }
                }
                return Err(AuthError::TokenReused);
            }
            None => {
                warn!(account_id = %account.id, "Refresh attempted with no live session");
                return Err(AuthError::TokenReused);
            }
        }

        let pair = self.sign_pair(&account.id)?;
        let rotated = self
            .repository
            .swap_refresh_token(&account.id, Some(presented), Some(&pair.refresh_token))
            .await
            .map_err(|e| {
                error!(error = %e, account_id = %account.id, "Failed to persist rotated refresh token");
                AuthError::TokenIssuanceFailed
            })?;

        if !rotated {
            warn!(account_id = %account.id, "Lost refresh race, token already rotated");
            return Err(AuthError::TokenReused);
        }

        info!(account_id = %account.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Ends the account's session by clearing its stored refresh token
    #[instrument(skip(self))]
    pub async fn revoke(&self, account_id: &str) -> Result<(), AuthError> {
        self.repository.clear_refresh_token(account_id).await?;

        info!(account_id = %account_id, "Session revoked");
        Ok(())
    }

    /// Resolves an access token to its account.
    ///
    /// Access tokens are not tracked server-side, so one stays usable until it expires
    /// even after the session is revoked.
    #[instrument(skip(self, access_token))]
    pub async fn authenticate(&self, access_token: &str) -> Result<PublicAccount, AuthError> {
        let claims = self.access_tokens.verify(access_token)?;

        let account = self
            .repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(account_id = %claims.sub, "Access token names unknown account");
                AuthError::InvalidToken
            })?;

        debug!(account_id = %account.id, "Access token authenticated");
        Ok(account.to_public())
    }

    fn sign_pair(&self, account_id: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.access_tokens.issue(account_id)?,
            refresh_token: self.refresh_tokens.issue(account_id)?,
        })
    }
}

/// Byte comparison whose running time doesn't depend on where the inputs differ
fn tokens_match(stored: &str, presented: &str) -> bool {
    let (a, b) = (stored.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
