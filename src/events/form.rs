use serde::Deserialize;
use uuid::Uuid;

use crate::render::EventPayload;

use super::lenient;

/// `common:form:create` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FormSubmitted {
    /// Submitted fields in the order the form sent them
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Stored submission id
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Form the submission belongs to
    #[serde(default)]
    pub form_uuid: Option<Uuid>,
}

impl FormSubmitted {
    pub fn to_payload(&self) -> EventPayload {
        EventPayload::from(self.data.clone())
    }

    /// Admin page of this submission; needs both ids
    pub fn link_path(&self) -> Option<String> {
        match (self.form_uuid, self.uuid) {
            (Some(form), Some(entry)) => Some(format!("cup/form/{}/view/{}", form, entry)),
            _ => None,
        }
    }
}
