//! Database - Pool di connessioni SQLite e migrations embedded

use crate::core::Config;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, instrument};

/// Migrations in `server/migrations`, incluse nel binario a compile time
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Apre il pool, crea il file del database se manca e applica le migrations
#[instrument(skip(config))]
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("Database ready, migrations applied");
    Ok(pool)
}
