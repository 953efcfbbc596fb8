use donation_desk::{
    config::{database, settings},
    core::items,
    errors::{Error, Result},
};
use dotenvy::dotenv;
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
    info!("Attempted to load .env file.");

    // 3. Load settings (country defaults and the seed catalog)
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    info!(
        "Settings loaded: default country {}, {} catalog entries",
        settings.default_country,
        settings.catalog.len()
    );

    // 4. Connect and create tables
    let database_url = database::get_database_url();
    if database_url == database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data").map_err(|e| Error::Config {
            message: format!("Failed to create data directory: {e}"),
        })?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to the store: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the catalog on first run
    let seeded = items::seed_catalog(&db, &settings.catalog)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    let available = items::list_available(&db).await?;
    let pending = items::list_pending(&db).await?;
    info!(
        "Store ready: {} seeded, {} items available, {} donations awaiting review",
        seeded,
        available.len(),
        pending.len()
    );

    Ok(())
}
