use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::database::schema::SCHEMA_SQL;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        // Surface duplicate-key failures as a typed variant so callers can
        // translate them to HTTP 409 without matching on error text.
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.kind(), ErrorKind::UniqueViolation) {
                return DatabaseError::UniqueViolation(db_err.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Open the single shared SQLite pool and apply the schema.
///
/// The pool is built once at process start and handed to handlers through
/// application state; nothing in the request path initializes storage lazily.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, DatabaseError> {
    let path = database_path(&config.database.url);

    // The store is a single file; make sure its directory exists first.
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    migrate(&pool).await?;

    info!("Opened database at {}", path);
    Ok(pool)
}

/// Apply the embedded schema. Idempotent: every statement is IF NOT EXISTS.
pub async fn migrate(pool: &SqlitePool) -> Result<(), DatabaseError> {
    pool.execute(SCHEMA_SQL)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Accepts either a bare filesystem path or a sqlite:// URL.
fn database_path(url: &str) -> String {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
        .to_string()
}
