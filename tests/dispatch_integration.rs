//! End-to-end dispatch tests
//!
//! A local axum server stands in for the Telegram Bot API. The real
//! `TelegramClient` talks to it over HTTP, so these tests cover the whole path
//! from an incoming event to the recorded `sendMessage` calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use form2telegram::config::{Settings, TelegramConfig};
use form2telegram::events::{
    FormHandler, FormSubmitted, HandlerOptions, Notifier, SkipReason, FORM_SUBMITTED, ORDER_CREATED,
};
use form2telegram::parameters::{MemoryParameterStore, ParameterKeys, ParameterStore};
use form2telegram::server::{create_app, AppState};
use form2telegram::telegram::TelegramClient;

const TOKEN: &str = "123456:test-token";

#[derive(Debug, Clone)]
struct Call {
    bot: String,
    method: String,
    query: HashMap<String, String>,
}

/// Records every Bot API call and answers like Telegram would
#[derive(Clone, Default)]
struct FakeTelegram {
    calls: Arc<Mutex<Vec<Call>>>,
    pending_chats: Arc<Mutex<Vec<i64>>>,
}

impl FakeTelegram {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "sendMessage")
            .collect()
    }

    fn set_pending_chats(&self, chats: &[i64]) {
        *self.pending_chats.lock().unwrap() = chats.to_vec();
    }
}

async fn bot_method(
    State(fake): State<FakeTelegram>,
    Path((bot, method)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.calls.lock().unwrap().push(Call {
        bot,
        method: method.clone(),
        query: query.clone(),
    });

    match method.as_str() {
        "getUpdates" => {
            let result: Vec<_> = fake
                .pending_chats
                .lock()
                .unwrap()
                .iter()
                .enumerate()
                .map(|(i, chat)| json!({"update_id": i, "message": {"chat": {"id": chat}}}))
                .collect();
            Json(json!({"ok": true, "result": result})).into_response()
        }
        "sendMessage" => match query.get("chat_id").map(String::as_str) {
            Some("500") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            Some("403") => Json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            }))
            .into_response(),
            _ => Json(json!({"ok": true, "result": {"message_id": 1}})).into_response(),
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_fake_telegram() -> (String, FakeTelegram) {
    let fake = FakeTelegram::default();
    let app = Router::new()
        .route("/{bot}/{method}", get(bot_method))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), fake)
}

fn settings_for(base_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.telegram = TelegramConfig {
        api_base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    settings
}

fn store_with(values: &[(&str, &str)]) -> Arc<MemoryParameterStore> {
    Arc::new(MemoryParameterStore::with_values(
        values.iter().map(|(k, v)| (k.to_string(), v.to_string())),
    ))
}

fn state_for(settings: Settings, store: Arc<MemoryParameterStore>) -> AppState {
    let api = Arc::new(TelegramClient::new(&settings.telegram).unwrap());
    AppState::new(settings, store, api)
}

async fn wait_for_sends(fake: &FakeTelegram, expected: usize) -> Vec<Call> {
    for _ in 0..100 {
        let sends = fake.sends();
        if sends.len() >= expected {
            return sends;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    fake.sends()
}

#[tokio::test]
async fn test_order_event_reaches_saved_and_discovered_chats() {
    let (base_url, fake) = spawn_fake_telegram().await;
    fake.set_pending_chats(&[20, 10]);

    let keys = ParameterKeys::default();
    let store = store_with(&[
        (&keys.token, TOKEN),
        (&keys.recipients, "-1;10"),
        (&keys.replaces, "name:Customer\nprice:Total"),
        (&keys.homepage, "https://shop.example/"),
    ]);
    let state = state_for(settings_for(&base_url), store.clone());

    let handlers = state
        .bus
        .publish(
            ORDER_CREATED,
            json!({
                "uuid": "0b5c3d2e-0000-4000-8000-000000000001",
                "delivery": {"client": "Jane_Doe", "address": "Main st. 1"},
                "phone": "555-01",
                "email": "jane@example.com",
                "comment": "",
                "products": [{"price": 120, "count": 2}, {"price": 10}]
            }),
        )
        .await;
    assert_eq!(handlers, 1);

    let calls = fake.calls();
    assert_eq!(calls[0].method, "getUpdates");
    assert!(calls.iter().all(|c| c.bot == format!("bot{}", TOKEN)));

    let sends = fake.sends();
    let chats: Vec<_> = sends.iter().map(|c| c.query["chat_id"].as_str()).collect();
    assert_eq!(chats, vec!["10", "20"]);

    let expected = "*Customer*: Jane Doe\n*phone*: 555-01\n*email*: jane@example.com\n*address*: Main st. 1\n*comment*: \n*Total*: 250\n\n[CUP](https://shop.example/cup/catalog/order/0b5c3d2e-0000-4000-8000-000000000001/edit)";
    for send in &sends {
        assert_eq!(send.query["text"], expected);
        assert_eq!(send.query["parse_mode"], "Markdown");
    }

    assert_eq!(
        store.get(&keys.recipients).await.unwrap().as_deref(),
        Some("-1;10;20")
    );
}

#[tokio::test]
async fn test_failed_sends_do_not_stop_the_loop() {
    let (base_url, fake) = spawn_fake_telegram().await;

    let keys = ParameterKeys::default();
    let store = store_with(&[(&keys.token, TOKEN), (&keys.recipients, "500;403;7")]);
    let settings = settings_for(&base_url);
    let api = Arc::new(TelegramClient::new(&settings.telegram).unwrap());
    let notifier = Arc::new(Notifier::new(store, api, keys));
    let handler = FormHandler::new(
        notifier,
        HandlerOptions {
            excluded_fields: vec!["recaptcha".to_string()],
            deep_link: false,
        },
    );

    let form: FormSubmitted = serde_json::from_value(json!({
        "data": {"name": "A_B", "phone": "555", "recaptcha": "x"}
    }))
    .unwrap();
    let report = handler.notify(&form).await;

    assert_eq!(report.recipients, 3);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 2);

    let sends = fake.sends();
    assert_eq!(sends.len(), 3);
    assert_eq!(sends[2].query["text"], "*name*: A B\n*phone*: 555\n");
}

#[tokio::test]
async fn test_without_token_nothing_is_sent() {
    let (base_url, fake) = spawn_fake_telegram().await;
    fake.set_pending_chats(&[1]);

    let keys = ParameterKeys::default();
    let store = store_with(&[(&keys.recipients, "10")]);
    let state = state_for(settings_for(&base_url), store.clone());

    state
        .bus
        .publish(FORM_SUBMITTED, json!({"data": {"name": "x"}}))
        .await;

    assert!(fake.calls().is_empty());
    assert_eq!(store.get(&keys.recipients).await.unwrap().as_deref(), Some("10"));
}

#[tokio::test]
async fn test_unreachable_api_keeps_saved_recipients() {
    // Nothing listens on this port once the listener is dropped
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let keys = ParameterKeys::default();
    let store = store_with(&[(&keys.token, TOKEN), (&keys.recipients, "10;11")]);
    let settings = settings_for(&base_url);
    let api = Arc::new(TelegramClient::new(&settings.telegram).unwrap());
    let notifier = Notifier::new(store.clone(), api, keys.clone());

    let config = notifier.load_config().await;
    let recipients = notifier.registry().list_recipients(&config).await;

    assert_eq!(recipients.serialize(), "10;11");
    assert_eq!(store.get(&keys.recipients).await.unwrap().as_deref(), Some("10;11"));
}

#[tokio::test]
async fn test_http_trigger_end_to_end() {
    let (base_url, fake) = spawn_fake_telegram().await;

    let keys = ParameterKeys::default();
    let store = store_with(&[(&keys.token, TOKEN), (&keys.recipients, "-1;42")]);
    let mut settings = settings_for(&base_url);
    settings.api.key = Some("secret".to_string());
    let state = state_for(settings, store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let event = json!({
        "event": FORM_SUBMITTED,
        "payload": {"data": {"email": "a@b.c", "recaptcha": "token"}}
    });

    let unauthorized = client
        .post(format!("http://{}/api/v1/events", addr))
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), reqwest::StatusCode::UNAUTHORIZED);

    let accepted = client
        .post(format!("http://{}/api/v1/events", addr))
        .header("X-API-Key", "secret")
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status(), reqwest::StatusCode::ACCEPTED);
    let body: serde_json::Value = accepted.json().await.unwrap();
    assert_eq!(body["handlers"], 1);

    let sends = wait_for_sends(&fake, 1).await;
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].query["chat_id"], "42");
    assert_eq!(sends[0].query["text"], "*email*: a@b.c\n");

    let recipients: serde_json::Value = client
        .get(format!("http://{}/api/v1/recipients", addr))
        .header("X-API-Key", "secret")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recipients["recipients"], json!(["-1", "42"]));
    assert_eq!(recipients["chat_ids"], json!(["42"]));

    let empty_event = client
        .post(format!("http://{}/api/v1/events", addr))
        .header("X-API-Key", "secret")
        .json(&json!({"event": " "}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_event.status(), reqwest::StatusCode::BAD_REQUEST);

    let health: serde_json::Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["parameters"]["delivery_enabled"], true);
}

#[tokio::test]
async fn test_only_unassigned_marker_skips_delivery() {
    let (base_url, fake) = spawn_fake_telegram().await;

    let keys = ParameterKeys::default();
    let store = store_with(&[(&keys.token, TOKEN), (&keys.recipients, "-1")]);
    let settings = settings_for(&base_url);
    let api = Arc::new(TelegramClient::new(&settings.telegram).unwrap());
    let handler = FormHandler::new(Arc::new(Notifier::new(store, api, keys)), HandlerOptions::default());

    let report = handler
        .notify(&serde_json::from_value(json!({"data": {"a": 1}})).unwrap())
        .await;

    assert_eq!(report.skipped, Some(SkipReason::NoRecipients));
    assert!(fake.sends().is_empty());
}
