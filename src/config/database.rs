//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! The single key-value table is generated from the entity definition with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust struct.

use crate::entities::KvEntry;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default location of the platform database when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://ielts_platform.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database named by `DATABASE_URL`.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the key-value table if it does not exist yet.
///
/// Safe to call on every startup against an existing database file.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut kv_table = schema.create_table_from_entity(KvEntry);
    kv_table.if_not_exists();

    db.execute(builder.build(&kv_table)).await?;

    Ok(())
}
