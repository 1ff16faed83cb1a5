use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::DispatchMetrics;
use crate::parameters::{ParameterKeys, ParameterStore, PluginConfig};
use crate::recipients::RecipientRegistry;
use crate::render::{render, EventPayload, RenderOptions};
use crate::telegram::BotApi;

/// Why a dispatch sent nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No bot token configured
    Disabled,
    /// Nobody to send to
    NoRecipients,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::NoRecipients => "no_recipients",
        }
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub event: String,
    /// Chats the message was addressed to
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
    pub skipped: Option<SkipReason>,
    pub dispatched_at: DateTime<Utc>,
}

impl DeliveryReport {
    fn new(event: &str) -> Self {
        Self {
            event: event.to_string(),
            recipients: 0,
            delivered: 0,
            failed: 0,
            skipped: None,
            dispatched_at: Utc::now(),
        }
    }

    fn skipped(event: &str, reason: SkipReason) -> Self {
        DispatchMetrics::record_skipped(reason.as_str());
        Self {
            skipped: Some(reason),
            ..Self::new(event)
        }
    }
}

/// What a handler asks the notifier to send
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub payload: EventPayload,
    pub excluded_fields: Vec<String>,
    /// Admin path relative to the homepage, appended as a link when set
    pub link_path: Option<String>,
}

/// Renders events and sends them to every known chat.
pub struct Notifier {
    store: Arc<dyn ParameterStore>,
    api: Arc<dyn BotApi>,
    keys: ParameterKeys,
    registry: RecipientRegistry,
}

impl Notifier {
    pub fn new(store: Arc<dyn ParameterStore>, api: Arc<dyn BotApi>, keys: ParameterKeys) -> Self {
        let registry = RecipientRegistry::new(store.clone(), api.clone(), &keys);
        Self {
            store,
            api,
            keys,
            registry,
        }
    }

    pub fn registry(&self) -> &RecipientRegistry {
        &self.registry
    }

    pub fn keys(&self) -> &ParameterKeys {
        &self.keys
    }

    /// Current plugin configuration snapshot
    pub async fn load_config(&self) -> PluginConfig {
        PluginConfig::load(self.store.as_ref(), &self.keys).await
    }

    /// Render `notification` and send it to every chat, one after another.
    ///
    /// Never fails. A send failure is logged and the next chat is still tried.
    #[tracing::instrument(name = "notifier.dispatch", skip(self, notification))]
    pub async fn dispatch(&self, event: &str, notification: Notification) -> DeliveryReport {
        DispatchMetrics::record_dispatch(event);

        let config = self.load_config().await;
        if !config.is_enabled() {
            tracing::debug!("No bot token configured, skipping");
            return DeliveryReport::skipped(event, SkipReason::Disabled);
        }

        let mut options = RenderOptions::new().exclude(notification.excluded_fields);
        if let Some(path) = notification.link_path {
            options = options.deep_link(format!("{}{}", config.homepage, path));
        }
        let text = render(&notification.payload, &config.substitutions, &options);

        let recipients = self.registry.list_recipients(&config).await;
        let chat_ids: Vec<&str> = recipients.chat_ids().collect();
        if chat_ids.is_empty() {
            tracing::info!("No recipients to notify");
            return DeliveryReport::skipped(event, SkipReason::NoRecipients);
        }

        let mut report = DeliveryReport::new(event);
        report.recipients = chat_ids.len();

        for chat_id in chat_ids {
            match self.api.send_message(config.token.as_ref(), chat_id, &text).await {
                Some(response) if response.ok => {
                    DispatchMetrics::record_sent();
                    report.delivered += 1;
                }
                Some(response) => {
                    DispatchMetrics::record_failed();
                    report.failed += 1;
                    tracing::warn!(
                        chat_id = %chat_id,
                        error_code = ?response.error_code,
                        description = ?response.description,
                        "Telegram rejected message"
                    );
                }
                None => {
                    DispatchMetrics::record_failed();
                    report.failed += 1;
                    tracing::warn!(chat_id = %chat_id, "Message not delivered");
                }
            }
        }

        tracing::info!(
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "Dispatch finished"
        );

        report
    }
}
