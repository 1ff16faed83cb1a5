use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::{ParameterResult, ParameterStore};

/// Process-local parameter store. Values are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    values: DashMap<String, String>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with the given pairs
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (key, value) in values {
            store.values.insert(key.into(), value.into());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get(&self, key: &str) -> ParameterResult<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> ParameterResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
