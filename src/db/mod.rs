mod models;

pub use models::*;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

pub type DbPool = SqlitePool;

/// Failure while bringing up the database at startup.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to apply schema: {0}")]
    Schema(#[source] sqlx::Error),
}

/// Schema applied on every startup
pub(crate) const SCHEMA: &str = include_str!("../../migrations/001_initial.sql");

/// Execute a SQL migration file, properly handling comments
pub(crate) async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    // Strip comment lines first so a `;` inside a comment never splits a statement
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Open the pool and make sure every table exists. Safe to run against an
/// already initialized database.
pub async fn init(config: &DatabaseConfig) -> Result<DbPool, StorageError> {
    info!(url = %config.url, "Initializing database");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|source| StorageError::Connect {
            url: config.url.clone(),
            source,
        })?;

    // WAL lets readers proceed while a handler writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .map_err(StorageError::Schema)?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .map_err(StorageError::Schema)?;

    execute_sql(&pool, SCHEMA)
        .await
        .map_err(StorageError::Schema)?;

    info!("Database initialized successfully");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config(dir: &tempfile::TempDir) -> DatabaseConfig {
        DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("users.db").display()),
            max_connections: 2,
        }
    }

    async fn table_names(pool: &DbPool) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_init_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init(&file_config(&dir)).await.unwrap();

        assert_eq!(
            table_names(&pool).await,
            vec!["attendance", "courts", "schedule", "users"]
        );
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        let pool = init(&config).await.unwrap();
        sqlx::query("INSERT INTO users (name, email) VALUES ('Ann', 'ann@example.com')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = init(&config).await.unwrap();
        let user: User = sqlx::query_as("SELECT * FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert!(user.password.is_none());
    }

    #[tokio::test]
    async fn test_execute_sql_ignores_semicolons_in_comments() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let sql = "-- first; with a semicolon\n\
                   CREATE TABLE a (id INTEGER);\n\
                   -- second; and another; here\n\
                   CREATE TABLE b (id INTEGER);\n";
        execute_sql(&pool, sql).await.unwrap();

        assert_eq!(table_names(&pool).await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_bundled_schema_applies_in_memory() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        execute_sql(&pool, SCHEMA).await.unwrap();
        execute_sql(&pool, SCHEMA).await.unwrap();

        assert!(table_names(&pool).await.contains(&"users".to_string()));
    }

    #[tokio::test]
    async fn test_init_reports_connect_failure() {
        let config = DatabaseConfig {
            url: "sqlite:/nonexistent-dir/nested/users.db".to_string(),
            max_connections: 1,
        };

        match init(&config).await {
            Err(StorageError::Connect { url, .. }) => assert_eq!(url, config.url),
            other => panic!("Expected connect failure, got {:?}", other.map(|_| ())),
        }
    }
}
