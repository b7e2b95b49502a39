use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::PublicAccount, service::AccountService, types::RegisterRequest};
use crate::shared::{ApiResponse, AppError, AppState};

/// HTTP handler for registering a new account
///
/// POST /api/v1/users/register
/// Returns the created account without password or session data
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicAccount>>), AppError> {
    let service = AccountService::new(Arc::clone(&state.account_repository));
    let account = service.register(request).await?;

    info!(account_id = %account.id, username = %account.username, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            account,
            "User registered successfully",
        )),
    ))
}

/// HTTP handler returning the authenticated account
///
/// GET /api/v1/users/current-user (authenticated)
#[instrument(name = "current_user", skip(account))]
pub async fn current_user(
    Extension(account): Extension<PublicAccount>,
) -> Json<ApiResponse<PublicAccount>> {
    Json(ApiResponse::ok(account, "Current user fetched"))
}
