use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct RecipientsResponse {
    /// Persisted entries, including the unassigned marker
    pub recipients: Vec<String>,
    /// Entries a message would be sent to
    pub chat_ids: Vec<String>,
}

/// GET /api/v1/recipients - saved list, without polling Telegram
pub async fn list_recipients(State(state): State<AppState>) -> Result<Json<RecipientsResponse>> {
    let list = state.notifier.registry().persisted().await?;

    Ok(Json(RecipientsResponse {
        recipients: list.iter().map(|r| r.to_string()).collect(),
        chat_ids: list.chat_ids().map(str::to_string).collect(),
    }))
}
