use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub type DbPool = SqlitePool;

/// Environment variable naming the SQLite database file
const DB_PATH_VAR: &str = "TRICOACH_DB_PATH";

#[derive(Debug, Error)]
pub enum DbError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),
}

/// Resolve the database file path from the environment (a `.env` file is
/// honored, existing variables win)
pub fn db_path_from_env() -> Result<PathBuf, DbError> {
  dotenvy::dotenv().ok();
  env::var(DB_PATH_VAR)
    .map(PathBuf::from)
    .map_err(|_| DbError::MissingConfig(DB_PATH_VAR.into()))
}

/// Initialize the connection pool for the database file at `path`,
/// creating the file if needed, and run migrations
pub async fn initialize_db(path: &Path) -> Result<DbPool, DbError> {
  let db_url = format!("sqlite://{}?mode=rwc", path.display());
  connect(&db_url).await
}

/// Connect to an explicit database URL and run migrations
pub async fn connect(db_url: &str) -> Result<DbPool, DbError> {
  info!(db_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("database ready");
  Ok(pool)
}
