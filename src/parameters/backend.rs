//! Backend trait for the key/value parameter store.
//!
//! Plugin settings (bot token, substitutions, saved chat ids) are plain string
//! values under namespaced keys. The host owns the storage; this trait is the only
//! view the dispatch pipeline has of it.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type ParameterResult<T> = Result<T, ParameterError>;

/// Key/value storage for plugin parameters.
///
/// Implementations must be thread-safe; one store is shared by every dispatch.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> ParameterResult<Option<String>>;

    /// Write a value, creating the key when missing and overwriting otherwise.
    async fn set(&self, key: &str, value: &str) -> ParameterResult<()>;

    /// Backend identifier used in logs and health output
    fn backend_name(&self) -> &'static str;
}
