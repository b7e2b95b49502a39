use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::account::repository::AccountRepository;
use crate::auth::{AuthError, SessionManager};
use crate::config::AuthConfig;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub account_repository: Arc<dyn AccountRepository + Send + Sync>,
    pub session_manager: Arc<SessionManager>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        auth_config: AuthConfig,
    ) -> Self {
        let session_manager = Arc::new(SessionManager::new(
            Arc::clone(&account_repository),
            &auth_config,
        ));

        Self {
            account_repository,
            session_manager,
            auth_config: Arc::new(auth_config),
        }
    }
}

/// Uniform envelope for every JSON body the API returns
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Auth(auth) => match auth {
                // Same answer for unknown account and wrong password, no account enumeration
                AuthError::NotFound | AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid username, email or password".to_string(),
                ),
                AuthError::InvalidToken | AuthError::TokenReused => {
                    (StatusCode::UNAUTHORIZED, auth.to_string())
                }
                AuthError::TokenIssuanceFailed => {
                    (StatusCode::INTERNAL_SERVER_ERROR, auth.to_string())
                }
                AuthError::Store(msg) => {
                    error!(error = %msg, "Account store failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(ApiResponse::new(status, (), message));

        (status, body).into_response()
    }
}
