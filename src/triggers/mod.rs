//! Ways for the host to raise events: HTTP and Redis pub/sub.

mod backoff;
mod http;
mod redis;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use http::{publish_event, EventAccepted, EventRequest};
pub use redis::{RedisEventMessage, RedisSubscriber};
