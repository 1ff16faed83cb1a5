use std::sync::Arc;

use tokio::sync::Mutex;

use crate::metrics::{DispatchMetrics, ParameterMetrics};
use crate::parameters::{ParameterKeys, ParameterResult, ParameterStore, PluginConfig};
use crate::telegram::BotApi;

use super::list::{Recipient, RecipientList};

/// Keeps the saved chat id list and grows it from `getUpdates`.
pub struct RecipientRegistry {
    store: Arc<dyn ParameterStore>,
    api: Arc<dyn BotApi>,
    key: String,
    /// Serialises read-merge-write of the persisted list within this process
    refresh_lock: Mutex<()>,
}

impl RecipientRegistry {
    pub fn new(store: Arc<dyn ParameterStore>, api: Arc<dyn BotApi>, keys: &ParameterKeys) -> Self {
        Self {
            store,
            api,
            key: keys.recipients.clone(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// The persisted list, without polling.
    pub async fn persisted(&self) -> ParameterResult<RecipientList> {
        let raw = self.store.get(&self.key).await?.unwrap_or_default();
        Ok(RecipientList::parse(&raw))
    }

    /// Saved recipients merged with chats found in pending updates.
    ///
    /// Polling problems are logged and leave the saved list as it is. The list is
    /// written back only when new chat ids were found.
    #[tracing::instrument(name = "recipients.list", skip(self, config))]
    pub async fn list_recipients(&self, config: &PluginConfig) -> RecipientList {
        let _guard = self.refresh_lock.lock().await;

        // Re-read under the lock: another dispatch may have written since the
        // config snapshot was taken.
        let raw = match self.store.get(&self.key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                ParameterMetrics::record_error("get");
                tracing::warn!(error = %e, "Failed to re-read recipients, using snapshot");
                config.recipients.clone()
            }
        };
        let mut recipients = RecipientList::parse(&raw);

        let updates = match self.api.fetch_updates(config.token.as_ref()).await {
            Some(response) if response.ok => response.result.unwrap_or_default(),
            Some(response) => {
                tracing::warn!(
                    error_code = ?response.error_code,
                    description = ?response.description,
                    "getUpdates reported failure, using saved recipients"
                );
                return recipients;
            }
            None => {
                tracing::debug!("getUpdates unavailable, using saved recipients");
                return recipients;
            }
        };

        let added = recipients.extend(
            updates
                .iter()
                .filter_map(|update| update.chat_id())
                .map(|id| Recipient::parse(&id)),
        );

        if added > 0 {
            DispatchMetrics::record_discovered(added as u64);
            let serialized = recipients.serialize();
            match self.store.set(&self.key, &serialized).await {
                Ok(()) => {
                    tracing::info!(added = added, recipients = %serialized, "Saved newly discovered chats");
                }
                Err(e) => {
                    ParameterMetrics::record_error("set");
                    tracing::warn!(error = %e, "Failed to save discovered chats");
                }
            }
        }

        recipients
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::parameters::MemoryParameterStore;
    use crate::telegram::BotToken;

    /// Replies to every call with a fixed body (or nothing)
    struct StaticApi {
        reply: Option<serde_json::Value>,
        calls: AtomicUsize,
    }

    impl StaticApi {
        fn new(reply: Option<serde_json::Value>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BotApi for StaticApi {
        async fn call_api(
            &self,
            token: Option<&BotToken>,
            _endpoint: &str,
            _params: &[(&str, String)],
        ) -> Option<serde_json::Value> {
            token?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Memory store that counts writes
    struct CountingStore {
        inner: MemoryParameterStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ParameterStore for CountingStore {
        async fn get(&self, key: &str) -> ParameterResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> ParameterResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    fn updates(ids: &[i64]) -> serde_json::Value {
        let result: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| json!({"update_id": i, "message": {"chat": {"id": id}}}))
            .collect();
        json!({"ok": true, "result": result})
    }

    async fn setup(
        persisted: &str,
        api: Arc<StaticApi>,
    ) -> (RecipientRegistry, Arc<CountingStore>, PluginConfig) {
        let keys = ParameterKeys::default();
        let store = Arc::new(CountingStore {
            inner: MemoryParameterStore::with_values([
                (keys.recipients.clone(), persisted.to_string()),
                (keys.token.clone(), "token".to_string()),
            ]),
            writes: AtomicUsize::new(0),
        });
        let config = PluginConfig::load(store.as_ref(), &keys).await;
        let registry = RecipientRegistry::new(store.clone(), api, &keys);
        (registry, store, config)
    }

    #[tokio::test]
    async fn test_discovered_duplicate_does_not_grow_list() {
        let (registry, store, config) = setup("1;2;2;3", StaticApi::new(Some(updates(&[2])))).await;

        let list = registry.list_recipients(&config).await;

        assert_eq!(list.serialize(), "1;2;3");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_new_chats_are_appended_and_saved() {
        let (registry, store, config) =
            setup("1", StaticApi::new(Some(updates(&[5, -100200, 5])))).await;

        let list = registry.list_recipients(&config).await;

        assert_eq!(list.serialize(), "1;5;-100200");
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(
            registry.persisted().await.unwrap().serialize(),
            "1;5;-100200"
        );
    }

    #[tokio::test]
    async fn test_updates_without_message_are_ignored() {
        let reply = json!({"ok": true, "result": [{"update_id": 1, "edited_message": {}}]});
        let (registry, store, config) = setup("7", StaticApi::new(Some(reply))).await;

        assert_eq!(registry.list_recipients(&config).await.serialize(), "7");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_polling_failure_keeps_saved_list() {
        for reply in [
            None,
            Some(json!({"ok": false, "error_code": 409, "description": "Conflict"})),
            Some(json!({"unexpected": true})),
        ] {
            let (registry, store, config) = setup("-1;10;20", StaticApi::new(reply)).await;

            let list = registry.list_recipients(&config).await;

            assert_eq!(list.serialize(), "-1;10;20");
            assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_missing_token_skips_polling() {
        let api = StaticApi::new(Some(updates(&[9])));
        let (registry, _store, mut config) = setup("1", api.clone()).await;
        config.token = None;

        assert_eq!(registry.list_recipients(&config).await.serialize(), "1");
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}
