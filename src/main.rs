use models::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod database;
mod models;
mod scraping;
mod server;

use config::{load_config, Config};
use database::create_db_pool;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    // Setup logging
    std::env::set_var(
        "RUST_LOG",
        format!("scrapriq={},hyper=warn,rocket=warn", config.logging.level),
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("scrapriq=info".parse().unwrap()),
        )
        .init();

    // Initialize database
    info!("Initializing database...");
    let db_pool = create_db_pool(&config.database.path).await?;

    info!(
        "🚀 Starting ScraprIQ API on {}:{}",
        config.server.address, config.server.port
    );

    // Rocket installs its own graceful shutdown (Ctrl+C) handling
    server::build_rocket(config, db_pool)
        .launch()
        .await
        .map_err(|e| format!("Rocket launch failed: {}", e))?;

    Ok(())
}
