//! Service entry point: initialize logging, load configuration, connect the
//! database, and serve the HTTP API.

use dotenvy::dotenv;
use keystock::{api, config, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()?;
    info!(bind_addr = %app_config.bind_addr, "Loaded application configuration");

    // 4. Initialize the database
    let db = config::database::connect(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    config::database::create_tables(&db).await?;

    // 5. Serve the API
    let app = api::router(api::AppState::new(db));
    let listener = tokio::net::TcpListener::bind(&app_config.bind_addr).await?;
    info!(addr = %app_config.bind_addr, "Listening for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
