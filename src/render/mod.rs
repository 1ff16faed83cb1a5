//! Payload rendering.
//!
//! Turns an ordered payload into the Markdown body sent to every recipient:
//!
//! ```text
//! *name*: A B
//! *phone*: 555
//! ```
//!
//! Labels come from the raw field keys and are rewritten afterwards by the
//! configured substitution rules. No length limit is enforced here; Telegram
//! rejects messages over 4096 characters and such a send is reported as failed.

mod payload;
mod substitution;

use smallvec::SmallVec;

pub use payload::{value_to_text, EventPayload};
pub use substitution::{SubstitutionRule, SubstitutionRules};

/// Event-type specific rendering switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    excluded_fields: SmallVec<[String; 4]>,
    deep_link: Option<String>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never render fields with these keys
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Append a trailing link line pointing at `url`
    pub fn deep_link(mut self, url: impl Into<String>) -> Self {
        self.deep_link = Some(url.into());
        self
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded_fields.iter().any(|f| f == key)
    }

    pub fn link(&self) -> Option<&str> {
        self.deep_link.as_deref()
    }
}

/// Render a payload. Pure and infallible: same inputs, same bytes.
pub fn render(payload: &EventPayload, rules: &SubstitutionRules, options: &RenderOptions) -> String {
    let mut body = String::new();

    for (key, value) in payload.iter() {
        if options.is_excluded(key) {
            continue;
        }
        let text = value_to_text(value).replace('_', " ");
        body.push_str(&format!("*{}*: {}\n", key, text));
    }

    let mut body = rules.apply(&body);

    if let Some(link) = options.link() {
        body.push_str(&format!("\n[CUP]({})", link));
    }

    body
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn sample() -> EventPayload {
        EventPayload::new()
            .field("name", "A_B")
            .field("phone", "555")
            .field("recaptcha", "x")
    }

    #[test]
    fn test_excluded_fields_are_dropped() {
        let options = RenderOptions::new().exclude(["recaptcha"]);
        let text = render(&sample(), &SubstitutionRules::default(), &options);

        assert_eq!(text, "*name*: A B\n*phone*: 555\n");
    }

    #[test]
    fn test_substitution_applied_after_rendering() {
        let options = RenderOptions::new().exclude(["recaptcha"]);
        let rules = SubstitutionRules::parse("name:Full Name");

        assert_eq!(
            render(&sample(), &rules, &options),
            "*Full Name*: A B\n*phone*: 555\n"
        );
    }

    #[test]
    fn test_underscores_in_values_become_spaces() {
        let payload = EventPayload::new().field("snake_key", "a_b__c_");
        let text = render(&payload, &SubstitutionRules::default(), &RenderOptions::new());

        assert_eq!(text, "*snake_key*: a b  c \n");
    }

    #[test]
    fn test_rules_match_raw_key_not_display_text() {
        let payload = EventPayload::new().field("first_name", "Ann");
        let rules = SubstitutionRules::parse("first name:Name\nfirst_name:First name");
        let text = render(&payload, &rules, &RenderOptions::new());

        assert_eq!(text, "*First name*: Ann\n");
    }

    #[test]
    fn test_deep_link_appended_last() {
        let payload = EventPayload::new().field("price", 10);
        let options = RenderOptions::new().deep_link("https://shop.test/cup/catalog/order/1/edit");
        let text = render(&payload, &SubstitutionRules::parse("price:Total"), &options);

        assert_eq!(
            text,
            "*Total*: 10\n\n[CUP](https://shop.test/cup/catalog/order/1/edit)"
        );
    }

    #[test]
    fn test_null_and_empty_payloads() {
        let payload = EventPayload::new().field("comment", Value::Null);
        assert_eq!(
            render(&payload, &SubstitutionRules::default(), &RenderOptions::new()),
            "*comment*: \n"
        );
        assert_eq!(
            render(&EventPayload::new(), &SubstitutionRules::default(), &RenderOptions::new()),
            ""
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let payload: EventPayload = [("b", json!(2)), ("a", json!("x_y")), ("c", json!(null))]
            .into_iter()
            .collect();
        let rules = SubstitutionRules::parse("a:Alpha\nb:Beta");
        let options = RenderOptions::new().exclude(["c"]);

        let first = render(&payload, &rules, &options);
        for _ in 0..10 {
            assert_eq!(render(&payload, &rules, &options), first);
        }
        assert!(!first.contains("*c*"));
    }
}
