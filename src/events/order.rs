use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::render::EventPayload;

use super::lenient;

/// `common:catalog:order:create` payload.
///
/// Contact fields take any scalar and prices take numeric strings, so a loosely
/// typed host payload still produces a message.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreated {
    pub uuid: Uuid,
    /// Registered customer, when the order was placed while logged in
    #[serde(default)]
    pub user: Option<OrderUser>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub delivery: Delivery,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub products: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUser {
    #[serde(default, deserialize_with = "lenient::text")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
}

impl OrderUser {
    /// "First Last", falling back to the username.
    pub fn name(&self) -> String {
        let full = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.username.clone().unwrap_or_default()
        } else {
            full
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delivery {
    #[serde(default, deserialize_with = "lenient::text")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    /// Null or unparsable prices count as zero
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default = "default_count", deserialize_with = "lenient::number")]
    pub count: f64,
}

fn default_count() -> f64 {
    1.0
}

impl OrderCreated {
    pub fn total_sum(&self) -> f64 {
        self.products.iter().map(|line| line.price * line.count).sum()
    }

    /// Admin page of this order, relative to the homepage
    pub fn link_path(&self) -> String {
        format!("cup/catalog/order/{}/edit", self.uuid)
    }

    /// Fields shown in the message, in display order.
    ///
    /// Contact details prefer the registered user and fall back to what was
    /// entered on the order.
    pub fn to_payload(&self) -> EventPayload {
        let user = self.user.as_ref();

        let name = match user {
            Some(user) => Some(user.name()),
            None => self.delivery.client.clone(),
        };
        let phone = user
            .and_then(|u| non_empty(&u.phone))
            .or_else(|| self.phone.clone());
        let email = user
            .and_then(|u| non_empty(&u.email))
            .or_else(|| self.email.clone());

        EventPayload::new()
            .field("name", optional(name))
            .field("phone", optional(phone))
            .field("email", optional(email))
            .field("address", optional(self.delivery.address.clone()))
            .field("comment", optional(self.comment.clone()))
            .field("price", amount(self.total_sum()))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn optional(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

fn amount(value: f64) -> Value {
    Value::String(lenient::format_amount(value))
}
