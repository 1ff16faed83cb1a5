//! PostgreSQL-backed parameter store.
//!
//! Table structure:
//! - `parameters (key TEXT PRIMARY KEY, value TEXT NOT NULL)`

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

use super::backend::{ParameterResult, ParameterStore};

pub struct PostgresParameterStore {
    pool: PgPool,
}

impl PostgresParameterStore {
    /// Open a pool and make sure the `parameters` table exists.
    pub async fn connect(config: &DatabaseConfig) -> ParameterResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await?;

        tracing::info!(
            pool_size = config.pool_size,
            "PostgreSQL connection pool created"
        );

        let store = Self::with_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> ParameterResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parameters (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for PostgresParameterStore {
    async fn get(&self, key: &str) -> ParameterResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM parameters WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> ParameterResult<()> {
        sqlx::query(
            r#"
            INSERT INTO parameters (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
