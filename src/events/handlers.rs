use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DispatchConfig;

use super::bus::{EventBus, EventHandler, FORM_SUBMITTED, ORDER_CREATED};
use super::form::FormSubmitted;
use super::notifier::{DeliveryReport, Notification, Notifier};
use super::order::OrderCreated;

/// Rendering switches for one event type
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    pub excluded_fields: Vec<String>,
    pub deep_link: bool,
}

pub struct OrderHandler {
    notifier: Arc<Notifier>,
    options: HandlerOptions,
}

impl OrderHandler {
    pub fn new(notifier: Arc<Notifier>, options: HandlerOptions) -> Self {
        Self { notifier, options }
    }

    pub async fn notify(&self, order: &OrderCreated) -> DeliveryReport {
        let notification = Notification {
            payload: order.to_payload(),
            excluded_fields: self.options.excluded_fields.clone(),
            link_path: self.options.deep_link.then(|| order.link_path()),
        };
        self.notifier.dispatch(ORDER_CREATED, notification).await
    }
}

#[async_trait]
impl EventHandler for OrderHandler {
    async fn handle(&self, payload: serde_json::Value) {
        match serde_json::from_value::<OrderCreated>(payload) {
            Ok(order) => {
                self.notify(&order).await;
            }
            Err(e) => {
                tracing::warn!(event = ORDER_CREATED, error = %e, "Ignoring malformed order event");
            }
        }
    }
}

pub struct FormHandler {
    notifier: Arc<Notifier>,
    options: HandlerOptions,
}

impl FormHandler {
    pub fn new(notifier: Arc<Notifier>, options: HandlerOptions) -> Self {
        Self { notifier, options }
    }

    pub async fn notify(&self, form: &FormSubmitted) -> DeliveryReport {
        let notification = Notification {
            payload: form.to_payload(),
            excluded_fields: self.options.excluded_fields.clone(),
            link_path: if self.options.deep_link {
                form.link_path()
            } else {
                None
            },
        };
        self.notifier.dispatch(FORM_SUBMITTED, notification).await
    }
}

#[async_trait]
impl EventHandler for FormHandler {
    async fn handle(&self, payload: serde_json::Value) {
        match serde_json::from_value::<FormSubmitted>(payload) {
            Ok(form) => {
                self.notify(&form).await;
            }
            Err(e) => {
                tracing::warn!(event = FORM_SUBMITTED, error = %e, "Ignoring malformed form event");
            }
        }
    }
}

/// Subscribe the order and form handlers on `bus`.
pub fn register_handlers(bus: &dyn EventBus, notifier: Arc<Notifier>, config: &DispatchConfig) {
    bus.register(
        ORDER_CREATED,
        Arc::new(OrderHandler::new(
            notifier.clone(),
            HandlerOptions {
                excluded_fields: config.order_excluded_fields.clone(),
                deep_link: config.order_deep_link,
            },
        )),
    );
    bus.register(
        FORM_SUBMITTED,
        Arc::new(FormHandler::new(
            notifier,
            HandlerOptions {
                excluded_fields: config.form_excluded_fields.clone(),
                deep_link: config.form_deep_link,
            },
        )),
    );
}
