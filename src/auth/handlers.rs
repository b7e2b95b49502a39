use axum::{extract::State, http::HeaderMap, Extension, Json};
use tracing::{info, instrument, warn};

use super::{
    cookies::{cleared_session_cookies, read_cookie, session_cookies, REFRESH_TOKEN_COOKIE},
    types::{LoginRequest, RefreshRequest, SessionResponse},
};
use crate::{
    account::models::PublicAccount,
    shared::{ApiResponse, AppError, AppState},
};

/// HTTP handler for logging in with username or email
///
/// POST /api/v1/users/login
/// Returns the account and a token pair, also set as http-only cookies
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<ApiResponse<SessionResponse>>), AppError> {
    let identifier = request.identifier().ok_or_else(|| {
        AppError::Validation("Username or email is required".to_string())
    })?;

    let (account, pair) = state
        .session_manager
        .login(identifier, &request.password)
        .await?;

    info!(account_id = %account.id, "User logged in");

    let cookies = session_cookies(&pair, &state.auth_config);
    let body = SessionResponse {
        user: Some(account),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((cookies, Json(ApiResponse::ok(body, "User logged in successfully"))))
}

/// HTTP handler for rotating the token pair
///
/// POST /api/v1/users/refresh-token
/// Reads the refresh token from its cookie, falling back to the JSON body
#[instrument(name = "refresh_access_token", skip(state, headers, body))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(HeaderMap, Json<ApiResponse<SessionResponse>>), AppError> {
    let presented = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .or_else(|| body.and_then(|Json(request)| request.refresh_token))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Refresh requested without a token");
            AppError::Unauthorized("Refresh token is required".to_string())
        })?;

    let pair = state.session_manager.refresh(&presented).await?;

    let cookies = session_cookies(&pair, &state.auth_config);
    let body = SessionResponse {
        user: None,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((cookies, Json(ApiResponse::ok(body, "Access token refreshed"))))
}

/// HTTP handler for logging out
///
/// POST /api/v1/users/logout (authenticated)
/// Clears the stored refresh token and the session cookies
#[instrument(name = "logout", skip(state, account))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(account): Extension<PublicAccount>,
) -> Result<(HeaderMap, Json<ApiResponse<()>>), AppError> {
    state.session_manager.revoke(&account.id).await?;

    info!(account_id = %account.id, "User logged out");

    Ok((
        cleared_session_cookies(&state.auth_config),
        Json(ApiResponse::ok((), "User logged out")),
    ))
}
