use thiserror::Error;

use crate::shared::AppError;

/// Failures of credential verification and the token lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Account not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Refresh token is expired or has already been used")]
    TokenReused,

    #[error("Failed to issue session tokens")]
    TokenIssuanceFailed,

    #[error("Account store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Only issuance and store failures are worth retrying from the caller's side
    pub fn is_retriable(&self) -> bool {
        matches!(self, AuthError::TokenIssuanceFailed | AuthError::Store(_))
    }
}

impl From<AppError> for AuthError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Auth(inner) => inner,
            AppError::NotFound(_) => AuthError::NotFound,
            other => AuthError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::NotFound, false)]
    #[case(AuthError::InvalidCredentials, false)]
    #[case(AuthError::InvalidToken, false)]
    #[case(AuthError::TokenReused, false)]
    #[case(AuthError::TokenIssuanceFailed, true)]
    #[case(AuthError::Store("timeout".to_string()), true)]
    fn test_retriable_kinds(#[case] error: AuthError, #[case] retriable: bool) {
        assert_eq!(error.is_retriable(), retriable);
    }
}
