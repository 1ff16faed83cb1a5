//! Redis-backed parameter store.
//!
//! All parameters live in a single hash:
//! - `{prefix}` - field = parameter key, value = parameter value

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::RedisConfig;

use super::backend::{ParameterResult, ParameterStore};

pub struct RedisParameterStore {
    connection: ConnectionManager,
    hash_key: String,
}

impl RedisParameterStore {
    /// Connect to Redis. The connection manager reconnects on its own after failures.
    pub async fn connect(config: &RedisConfig, hash_key: impl Into<String>) -> ParameterResult<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        let hash_key = hash_key.into();
        tracing::info!(hash_key = %hash_key, "Redis parameter store connected");

        Ok(Self {
            connection,
            hash_key,
        })
    }
}

#[async_trait]
impl ParameterStore for RedisParameterStore {
    async fn get(&self, key: &str) -> ParameterResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.hget(&self.hash_key, key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> ParameterResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.hset(&self.hash_key, key, value).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
