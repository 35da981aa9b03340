//! Telegram transport — long-polls the Bot API for updates.
//!
//! Text and photo messages arrive as `message` updates; menu selections
//! arrive as `callback_query` updates carrying the command token.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::dialogue::event::{InboundEvent, PhotoVariant};
use crate::error::TransportError;
use crate::transport::Transport;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

pub type EventStream = Pin<Box<dyn Stream<Item = InboundEvent> + Send>>;

/// Telegram transport — connects to the Bot API via long-polling.
pub struct TelegramTransport {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    /// Start the long-poll loop and return the stream of inbound events.
    pub fn start(&self) -> EventStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram transport listening for updates...");

            loop {
                let url = format!("https://api.telegram.org/bot{bot_token}/getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(event) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(event).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Box::pin(stream)
    }

    /// Send a single message chunk (≤4096 chars).
    async fn send_message_chunk(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(TransportError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: format!("sendMessage failed ({status}): {err}"),
            });
        }
        Ok(())
    }
}

/// Translate one Bot API update into an inbound event, if it carries one.
fn parse_update(update: &serde_json::Value) -> Option<InboundEvent> {
    if let Some(cq) = update.get("callback_query") {
        let chat_id = cq
            .get("message")
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(serde_json::Value::as_i64)?
            .to_string();
        let token = cq.get("data").and_then(serde_json::Value::as_str)?;
        return Some(InboundEvent::Menu {
            chat_id,
            token: token.to_string(),
        });
    }

    let message = update.get("message")?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)?
        .to_string();

    if let Some(photos) = message.get("photo").and_then(serde_json::Value::as_array) {
        let variants = photos
            .iter()
            .map(|p| PhotoVariant {
                file_ref: p
                    .get("file_id")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                size: p
                    .get("file_size")
                    .and_then(serde_json::Value::as_i64)
                    .unwrap_or(0),
            })
            .collect();
        return Some(InboundEvent::Photo { chat_id, variants });
    }

    if let Some(text) = message.get("text").and_then(serde_json::Value::as_str) {
        return Some(InboundEvent::Text {
            chat_id,
            text: text.to_string(),
        });
    }

    None
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Floor the cut to a char boundary so multi-byte text never
        // panics the slice.
        let mut cut = max_len;
        while cut > 0 && !remaining.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = remaining
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(remaining.len());
        }

        let chunk = &remaining[..cut];
        let split_at = chunk.rfind('\n').or_else(|| chunk.rfind(' ')).unwrap_or(cut);
        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { cut } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            self.send_message_chunk(chat_id, &chunk).await?;
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: &str,
        photo: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": photo,
        });
        if let Some(cap) = caption {
            body["caption"] = serde_json::Value::String(cap.to_string());
        }

        let resp = self
            .client
            .post(self.api_url("sendPhoto"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(TransportError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: format!("sendPhoto failed ({status}): {err}"),
            });
        }
        Ok(())
    }
}
