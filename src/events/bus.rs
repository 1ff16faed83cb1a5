//! Event subscription.
//!
//! The host raises events; this crate only supplies handlers. `EventBus` is the
//! registration seam, `InProcessEventBus` the implementation used by the bundled
//! HTTP and Redis triggers.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

/// Order created in the catalog
pub const ORDER_CREATED: &str = "common:catalog:order:create";

/// Form submitted on the site
pub const FORM_SUBMITTED: &str = "common:form:create";

/// Reacts to one event. Never fails: problems are logged by the handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: serde_json::Value);
}

pub trait EventBus: Send + Sync {
    fn register(&self, event_type: &str, handler: Arc<dyn EventHandler>);
}

#[derive(Default)]
pub struct InProcessEventBus {
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map(|h| h.len()).unwrap_or(0)
    }

    /// Run every handler registered for `event_type`, one after another.
    /// Returns how many handlers ran.
    #[tracing::instrument(name = "bus.publish", skip(self, payload))]
    pub async fn publish(&self, event_type: &str, payload: serde_json::Value) -> usize {
        // Clone out so no map guard is held across handler awaits
        let handlers = match self.handlers.get(event_type) {
            Some(handlers) => handlers.clone(),
            None => {
                tracing::debug!("No handlers registered for event");
                return 0;
            }
        };

        for handler in &handlers {
            handler.handle(payload.clone()).await;
        }

        handlers.len()
    }
}

impl EventBus for InProcessEventBus {
    fn register(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
        tracing::debug!(event_type = %event_type, "Registered event handler");
    }
}
