//! PostgreSQL snippet store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::SnippetStore;
use crate::error::StoreError;
use crate::types::{Snippet, SnippetId};

/// DDL for the snippets table. Safe to run repeatedly.
pub const SNIPPETS_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS snippets (
    id          CHAR(24)    PRIMARY KEY,
    text        TEXT        NOT NULL CHECK (length(text) > 0),
    summary     TEXT        NOT NULL CHECK (length(summary) > 0),
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
)
"#;

/// Index backing the newest-first listing.
pub const SNIPPETS_CREATED_AT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS snippets_created_at_idx
    ON snippets (created_at DESC, id DESC)
"#;

/// Configuration for PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300 = 5 min).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800 = 30 min).
    pub max_lifetime_secs: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/snippets".to_string()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 2),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", 1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// PostgreSQL snippet store.
pub struct PostgresSnippetStore {
    pool: PgPool,
}

impl PostgresSnippetStore {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the snippets table and index if absent.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(SNIPPETS_TABLE_SCHEMA).execute(&self.pool).await?;
        sqlx::query(SNIPPETS_CREATED_AT_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Parse a snippet from a database row.
    fn parse_snippet_row(row: &sqlx::postgres::PgRow) -> Result<Snippet, StoreError> {
        let id: String = row.try_get("id").map_err(StoreError::backend)?;
        let text: String = row.try_get("text").map_err(StoreError::backend)?;
        let summary: String = row.try_get("summary").map_err(StoreError::backend)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(StoreError::backend)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(StoreError::backend)?;

        // A stored id that fails to parse is corrupt data, not a caller error.
        let id = SnippetId::parse(id.trim()).map_err(StoreError::backend)?;

        Ok(Snippet {
            id,
            text,
            summary,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl SnippetStore for PostgresSnippetStore {
    async fn insert(&self, text: &str, summary: &str) -> Result<Snippet, StoreError> {
        // One clock read stamps the id and both timestamp columns.
        let now = Utc::now();
        let id = SnippetId::generate_at(now);
        let row = sqlx::query(
            r#"
            INSERT INTO snippets (id, text, summary, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, text, summary, created_at, updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(text)
        .bind(summary)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Self::parse_snippet_row(&row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        let id = SnippetId::parse(id)?;
        let row = sqlx::query(
            r#"
            SELECT id, text, summary, created_at, updated_at
            FROM snippets
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.as_ref().map(Self::parse_snippet_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Snippet>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, summary, created_at, updated_at
            FROM snippets
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(Self::parse_snippet_row).collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snippets")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(count.max(0) as u64)
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL pointing at a scratch database
    async fn test_postgres_roundtrip() {
        let store = PostgresSnippetStore::from_env().await.unwrap();
        store.migrate().await.unwrap();

        let before = store.count().await.unwrap();
        let a = store.insert("first text", "first summary").await.unwrap();
        let b = store.insert("second text", "second summary").await.unwrap();
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(b.created_at, b.updated_at);
        assert_eq!(a.id.timestamp_secs() as i64, a.created_at.timestamp());

        let found = store.find_by_id(&a.id.to_string()).await.unwrap().unwrap();
        assert_eq!(found.text, "first text");

        let all = store.find_all().await.unwrap();
        let pos_a = all.iter().position(|s| s.id == a.id).unwrap();
        let pos_b = all.iter().position(|s| s.id == b.id).unwrap();
        assert!(pos_b < pos_a);

        assert_eq!(store.count().await.unwrap(), before + 2);
        assert!(matches!(
            store.find_by_id("invalid-id").await,
            Err(StoreError::MalformedKey(_))
        ));
    }
}
