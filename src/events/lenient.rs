//! Forgiving field deserializers for host payloads.
//!
//! Hosts send contact details as numbers as often as strings, and prices as
//! strings. A loosely typed field must never cost the whole notification.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::render::value_to_text;

/// Any scalar as text; null as `None`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(value_to_text(&other)),
    })
}

/// Numbers and numeric strings; null and anything unparsable count as zero.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Null as the type's default.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Amount as PHP prints a float: 14 significant digits, no trailing zeros.
pub(crate) fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = 13 - magnitude;
    if decimals <= 0 {
        let scale = 10f64.powi(-decimals);
        return format!("{:.0}", (value / scale).round() * scale);
    }

    let fixed = format!("{:.*}", decimals as usize, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
