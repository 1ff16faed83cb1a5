//! Telegram Bot API transport.
//!
//! Two endpoints are used: `sendMessage` (Markdown text to one chat) and
//! `getUpdates` (chat discovery). Requests are
//! `GET {api_base_url}/bot<token>/<endpoint>?<query>`.

mod client;
mod types;

pub use client::{BotApi, TelegramClient, TelegramError, GET_UPDATES, PARSE_MODE, SEND_MESSAGE};
pub use types::{ApiResponse, BotToken, Chat, Message, Update};
