//! Host events and the handlers that turn them into Telegram messages.

mod bus;
mod form;
mod handlers;
mod lenient;
mod notifier;
mod order;

pub use bus::{EventBus, EventHandler, InProcessEventBus, FORM_SUBMITTED, ORDER_CREATED};
pub use form::FormSubmitted;
pub use handlers::{register_handlers, FormHandler, HandlerOptions, OrderHandler};
pub use notifier::{DeliveryReport, Notification, Notifier, SkipReason};
pub use order::{Delivery, OrderCreated, OrderLine, OrderUser};
