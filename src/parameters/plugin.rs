//! The plugin's view of the parameter store: which keys it reads and the
//! per-dispatch snapshot built from them.

use crate::config::{ParameterSeed, ParametersConfig};
use crate::metrics::ParameterMetrics;
use crate::render::SubstitutionRules;
use crate::telegram::BotToken;

use super::backend::ParameterStore;

/// Fully qualified parameter keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterKeys {
    pub token: String,
    pub replaces: String,
    pub recipients: String,
    pub homepage: String,
}

impl ParameterKeys {
    pub fn new(namespace: &str, homepage_key: &str) -> Self {
        Self {
            token: format!("{namespace}_token"),
            replaces: format!("{namespace}_replaces"),
            recipients: format!("{namespace}_config"),
            homepage: homepage_key.to_string(),
        }
    }

    pub fn from_settings(settings: &ParametersConfig) -> Self {
        Self::new(&settings.namespace, &settings.homepage_key)
    }
}

impl Default for ParameterKeys {
    fn default() -> Self {
        Self::new("Form2TelegramPlugin", "common_homepage")
    }
}

/// Parameters read at the start of a dispatch.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    /// `None` disables delivery
    pub token: Option<BotToken>,
    pub substitutions: SubstitutionRules,
    /// Raw `;`-delimited chat id list as persisted
    pub recipients: String,
    /// Site base URL, used for deep links
    pub homepage: String,
}

impl PluginConfig {
    /// Snapshot the parameters. Read failures are logged and treated as unset.
    pub async fn load(store: &dyn ParameterStore, keys: &ParameterKeys) -> Self {
        let token = read(store, &keys.token)
            .await
            .filter(|t| !t.trim().is_empty())
            .map(BotToken::new);
        let replaces = read(store, &keys.replaces).await.unwrap_or_default();
        let recipients = read(store, &keys.recipients).await.unwrap_or_default();
        let homepage = read(store, &keys.homepage).await.unwrap_or_default();

        Self {
            token,
            substitutions: SubstitutionRules::parse(&replaces),
            recipients,
            homepage,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }
}

async fn read(store: &dyn ParameterStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            ParameterMetrics::record_error("get");
            tracing::warn!(
                key = %key,
                backend = store.backend_name(),
                error = %e,
                "Failed to read parameter, treating as unset"
            );
            None
        }
    }
}

/// Write seed values for keys that are still unset.
pub async fn seed_parameters(store: &dyn ParameterStore, keys: &ParameterKeys, seed: &ParameterSeed) {
    let pairs = [
        (&keys.token, &seed.token),
        (&keys.replaces, &seed.replaces),
        (&keys.recipients, &seed.recipients),
        (&keys.homepage, &seed.homepage),
    ];

    for (key, value) in pairs {
        let Some(value) = value else { continue };

        match store.get(key).await {
            Ok(Some(_)) => {
                tracing::debug!(key = %key, "Parameter already set, seed ignored");
            }
            Ok(None) => {
                if let Err(e) = store.set(key, value).await {
                    ParameterMetrics::record_error("set");
                    tracing::warn!(key = %key, error = %e, "Failed to seed parameter");
                }
            }
            Err(e) => {
                ParameterMetrics::record_error("get");
                tracing::warn!(key = %key, error = %e, "Failed to read parameter while seeding");
            }
        }
    }
}
