use std::sync::Arc;

use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::config::RedisConfig;
use crate::events::InProcessEventBus;

use super::backoff::ExponentialBackoff;

/// Message published by the host on a configured channel
#[derive(Debug, Deserialize)]
pub struct RedisEventMessage {
    /// Event type; falls back to the channel name when absent
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl RedisEventMessage {
    fn event_type<'a>(&'a self, channel: &'a str) -> &'a str {
        self.event.as_deref().filter(|e| !e.is_empty()).unwrap_or(channel)
    }
}

/// Feeds events published on Redis channels into the bus.
pub struct RedisSubscriber {
    config: RedisConfig,
    bus: Arc<InProcessEventBus>,
    shutdown: broadcast::Sender<()>,
}

impl RedisSubscriber {
    pub fn new(config: RedisConfig, bus: Arc<InProcessEventBus>) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self {
            config,
            bus,
            shutdown,
        }
    }

    pub fn shutdown_signal(&self) -> broadcast::Sender<()> {
        self.shutdown.clone()
    }

    /// Subscribe and reconnect with backoff until shutdown.
    pub async fn start(&self) -> anyhow::Result<()> {
        let channels = &self.config.channels;
        if channels.is_empty() {
            tracing::info!("No Redis channels configured, skipping Redis trigger");
            return Ok(());
        }

        tracing::info!(channels = ?channels, "Starting Redis trigger");

        let mut backoff = ExponentialBackoff::new();
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            match self.run_subscription_loop(channels, &mut backoff).await {
                Ok(()) => {
                    tracing::info!("Redis trigger stopped");
                    break;
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::error!(
                        error = %e,
                        attempt = backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "Redis subscription failed, reconnecting"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        Ok(())
    }

    async fn run_subscription_loop(
        &self,
        channels: &[String],
        backoff: &mut ExponentialBackoff,
    ) -> anyhow::Result<()> {
        let client = redis::Client::open(self.config.url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        for channel in channels {
            if channel.contains('*') || channel.contains('?') || channel.contains('[') {
                pubsub.psubscribe(channel).await?;
                tracing::debug!(pattern = %channel, "Subscribed to pattern");
            } else {
                pubsub.subscribe(channel).await?;
                tracing::debug!(channel = %channel, "Subscribed to channel");
            }
        }

        tracing::info!("Redis subscription established");
        backoff.reset();

        let mut message_stream = pubsub.on_message();
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Received shutdown signal");
                    return Ok(());
                }
                msg = message_stream.next() => {
                    let Some(msg) = msg else {
                        anyhow::bail!("Redis message stream ended");
                    };
                    let channel = msg.get_channel_name().to_string();
                    let payload: String = match msg.get_payload() {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to read message payload");
                            continue;
                        }
                    };
                    self.handle_message(&channel, &payload).await;
                }
            }
        }
    }

    async fn handle_message(&self, channel: &str, payload: &str) {
        let message: RedisEventMessage = match serde_json::from_str(payload) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, channel = %channel, "Failed to parse Redis event");
                return;
            }
        };

        let event = message.event_type(channel).to_string();
        let handlers = self.bus.publish(&event, message.payload).await;

        tracing::debug!(channel = %channel, event = %event, handlers = handlers, "Published Redis event");
    }
}
