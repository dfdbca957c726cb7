use dotenvy::dotenv;
use ielts_platform::{
    config::{self, database},
    core::{CollectionKey, Platform},
    errors::Result,
};
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

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Platform configuration (defaults when platform.toml is absent)
    let platform_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load platform configuration: {}", e))?;

    // 4. Database and schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed absent collections
    let platform = Platform::new(db, platform_config);
    let seeded = platform.initialize().await?;
    info!("Initialization complete, {} collection(s) seeded.", seeded.len());

    for key in CollectionKey::ALL {
        let value = platform.get(key).await;
        match value.as_array() {
            Some(items) => info!("{:<16} {} record(s)", key.as_str(), items.len()),
            None => info!("{:<16} singleton record", key.as_str()),
        }
    }

    platform.shutdown().await
}
