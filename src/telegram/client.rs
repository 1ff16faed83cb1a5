use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::TelegramConfig;
use crate::metrics::TelegramMetrics;

use super::types::{ApiResponse, BotToken, Update};

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

pub const SEND_MESSAGE: &str = "sendMessage";
pub const GET_UPDATES: &str = "getUpdates";

/// Markup dialect used for every outgoing message
pub const PARSE_MODE: &str = "Markdown";

/// Transport to the Bot API.
///
/// Implementors only provide `call_api`; the typed helpers decode on top of it.
/// None of the methods fail: every problem is logged and reported as `None`.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Call `endpoint` with query parameters and return the decoded JSON body.
    ///
    /// `None` without any request when `token` is absent.
    async fn call_api(
        &self,
        token: Option<&BotToken>,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Option<serde_json::Value>;

    async fn send_message(
        &self,
        token: Option<&BotToken>,
        chat_id: &str,
        text: &str,
    ) -> Option<ApiResponse<serde_json::Value>> {
        let params = [
            ("chat_id", chat_id.to_string()),
            ("text", text.to_string()),
            ("parse_mode", PARSE_MODE.to_string()),
        ];
        let body = self.call_api(token, SEND_MESSAGE, &params).await?;
        decode(SEND_MESSAGE, body)
    }

    async fn fetch_updates(&self, token: Option<&BotToken>) -> Option<ApiResponse<Vec<Update>>> {
        let body = self.call_api(token, GET_UPDATES, &[]).await?;
        decode(GET_UPDATES, body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: serde_json::Value) -> Option<ApiResponse<T>> {
    match serde_json::from_value(body) {
        Ok(response) => Some(response),
        Err(e) => {
            tracing::warn!(endpoint = %endpoint, error = %e, "Unexpected Telegram response shape");
            None
        }
    }
}

/// `reqwest`-based Bot API client.
///
/// Certificates are verified and redirects followed; every request is bounded by
/// `telegram.timeout_seconds`.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Fails when the TLS backend cannot be initialised.
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, token: &BotToken, endpoint: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, token.expose(), endpoint)
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    #[tracing::instrument(name = "telegram.call_api", skip(self, token, params))]
    async fn call_api(
        &self,
        token: Option<&BotToken>,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Option<serde_json::Value> {
        let Some(token) = token else {
            tracing::debug!("No bot token configured, skipping Telegram call");
            return None;
        };

        let logged: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
            .collect();
        tracing::info!(params = %serde_json::Value::Object(logged), "TelegramBot: request");

        let started = Instant::now();
        let response = match self
            .http
            .get(self.endpoint_url(token, endpoint))
            .query(params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                TelegramMetrics::record_request(endpoint, "transport", started.elapsed());
                // reqwest errors embed the URL, which carries the token
                tracing::warn!(error = %e.without_url(), "Telegram request failed");
                return None;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                TelegramMetrics::record_request(endpoint, "transport", started.elapsed());
                tracing::warn!(error = %e.without_url(), "Failed to read Telegram response body");
                return None;
            }
        };

        tracing::info!(status = status.as_u16(), response = %body, "TelegramBot: response");

        if !status.is_success() {
            TelegramMetrics::record_request(endpoint, "http_error", started.elapsed());
            tracing::warn!(status = status.as_u16(), "Telegram API returned an error status");
            return None;
        }

        if body.trim().is_empty() {
            TelegramMetrics::record_request(endpoint, "empty", started.elapsed());
            return None;
        }

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => {
                let outcome = if value.get("ok").and_then(|ok| ok.as_bool()) == Some(true) {
                    "ok"
                } else {
                    "api_error"
                };
                TelegramMetrics::record_request(endpoint, outcome, started.elapsed());
                Some(value)
            }
            Err(e) => {
                TelegramMetrics::record_request(endpoint, "decode", started.elapsed());
                tracing::warn!(error = %e, "Telegram response is not valid JSON");
                None
            }
        }
    }
}
