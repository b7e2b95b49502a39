use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::cookies::{read_cookie, ACCESS_TOKEN_COOKIE};
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the access token and adds the PublicAccount to the request.
/// The token comes from the `accessToken` cookie or an `Authorization: Bearer` header.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(account): Extension<PublicAccount>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = read_cookie(req.headers(), ACCESS_TOKEN_COOKIE)
        .or_else(|| {
            req.headers()
                .get(AUTHORIZATION)
                .and_then(|header| header.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Request carries no access token");
            AppError::Unauthorized("Unauthorized".to_string())
        })?;

    let account = match state.session_manager.authenticate(&token).await {
        Ok(account) => account,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return Err(e.into());
        }
    };

    debug!(account_id = %account.id, "Authentication successful, adding account to request");

    req.extensions_mut().insert(account);

    Ok(next.run(req).await)
}
