//! Plugin parameter persistence.
//!
//! # Backend Architecture
//!
//! - `MemoryParameterStore`: in-process `DashMap` (default)
//! - `RedisParameterStore`: one Redis hash
//! - `PostgresParameterStore`: a `parameters` table
//!
//! Use `create_parameter_store()` to build the backend named in configuration.

mod backend;
mod memory_backend;
mod plugin;
mod postgres_backend;
mod redis_backend;

use std::sync::Arc;

use crate::config::Settings;

pub use backend::{ParameterError, ParameterResult, ParameterStore};
pub use memory_backend::MemoryParameterStore;
pub use plugin::{seed_parameters, ParameterKeys, PluginConfig};
pub use postgres_backend::PostgresParameterStore;
pub use redis_backend::RedisParameterStore;

/// Create the parameter store selected by `parameters.backend`.
///
/// - `"redis"`: connects to `redis.url`
/// - `"postgres"`: connects to `database.url`
/// - anything else: memory
///
/// A backend that cannot be reached falls back to memory with a warning, so the
/// service still starts (delivery stays disabled until a token is present).
pub async fn create_parameter_store(settings: &Settings) -> Arc<dyn ParameterStore> {
    let params = &settings.parameters;

    let store: Arc<dyn ParameterStore> = match params.backend.as_str() {
        "redis" => match RedisParameterStore::connect(&settings.redis, &params.redis_prefix).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "Redis parameter store unavailable, falling back to memory");
                Arc::new(MemoryParameterStore::new())
            }
        },
        "postgres" => match &settings.database {
            Some(database) => match PostgresParameterStore::connect(database).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::warn!(error = %e, "PostgreSQL parameter store unavailable, falling back to memory");
                    Arc::new(MemoryParameterStore::new())
                }
            },
            None => {
                tracing::warn!(
                    "PostgreSQL parameter store requested but no database configured, falling back to memory"
                );
                Arc::new(MemoryParameterStore::new())
            }
        },
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown parameter backend, using memory");
            }
            Arc::new(MemoryParameterStore::new())
        }
    };

    tracing::info!(backend = store.backend_name(), "Parameter store ready");

    let keys = ParameterKeys::from_settings(params);
    seed_parameters(store.as_ref(), &keys, &params.seed).await;

    store
}
