use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use users::{
    config::{AppConfig, StorageBackend},
    repositories::{InMemoryUserStore, PgUserStore, UserStore},
    routes,
    service::UserService,
    state::AppState,
    validation::Validator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting user service");

    let config = AppConfig::load()?;
    info!(
        "Minimum age set to {} years",
        config.validation.minimum_age
    );

    let store: Arc<dyn UserStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let validator = Validator::new(config.validation.minimum_age);
    let app_state = AppState::new(UserService::new(store, validator));

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("User service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
