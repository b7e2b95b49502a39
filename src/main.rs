use authgate::{
    account::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository},
    config::Config,
    routes, AppState,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!("Server terminated: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting account authentication server");

    let config = Config::from_env()?;

    let account_repository: Arc<dyn AccountRepository + Send + Sync> =
        match &config.server.database_url {
            Some(database_url) => {
                let pool = sqlx::PgPool::connect(database_url).await?;
                let repository = PostgresAccountRepository::new(pool);
                repository.migrate().await?;
                info!("Using PostgreSQL account store");
                Arc::new(repository)
            }
            None => {
                warn!("DATABASE_URL not set, accounts are kept in memory only");
                Arc::new(InMemoryAccountRepository::new())
            }
        };

    let app_state = AppState::new(account_repository, config.auth.clone());

    let mut app = routes::router(app_state);
    if let Some(origin) = &config.server.cors_origin {
        app = app.layer(routes::cors_layer(origin)?);
        info!(origin = %origin, "CORS enabled");
    }

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
    info!("Server running on http://{}", config.server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
