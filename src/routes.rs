use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{account, auth, config::ConfigError, shared::AppState};

/// Request bodies larger than this are rejected before parsing
pub const BODY_LIMIT_BYTES: usize = 16 * 1024;

/// Builds the application router with all user routes mounted under `/api/v1/users`
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/current-user", get(account::current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    let users = Router::new()
        .route("/register", post(account::register))
        .route("/login", post(auth::login))
        .route("/refresh-token", post(auth::refresh_access_token))
        .merge(protected);

    Router::new()
        .route("/", get(|| async { "ready" }))
        .nest("/api/v1/users", users)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for a single browser origin, so the session cookies are sent cross-site
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidValue {
        key: "CORS_ORIGIN",
        value: origin.to_string(),
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}
