//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables and indexes are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.

use crate::entities::{Account, LedgerEntry};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Used when `DATABASE_URL` is not set. `mode=rwc` creates the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/bank.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes the process-wide connection handle.
///
/// The handle is created once at startup and passed to every component that needs it.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to {}", database_url);
    let db = Database::connect(database_url).await?;
    info!("Database connection established");
    Ok(db)
}

/// Creates the `accounts` and `ledger_entries` tables and their indexes if missing.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut account_table = schema.create_table_from_entity(Account);
    account_table.if_not_exists();
    let mut ledger_table = schema.create_table_from_entity(LedgerEntry);
    ledger_table.if_not_exists();

    db.execute(builder.build(&account_table)).await?;
    db.execute(builder.build(&ledger_table)).await?;

    for mut index in schema.create_index_from_entity(LedgerEntry) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    debug!("Tables ensured");
    Ok(())
}
