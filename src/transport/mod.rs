//! Outbound delivery and the Telegram channel behind it.

pub mod telegram;

use async_trait::async_trait;

use crate::dialogue::event::OutboundMessage;
use crate::error::TransportError;

pub use telegram::TelegramTransport;

/// Something that can push messages to a chat service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: &str,
        photo: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError>;
}

/// Deliver a single composed message.
pub async fn deliver_one(
    transport: &dyn Transport,
    message: &OutboundMessage,
) -> Result<(), TransportError> {
    match message {
        OutboundMessage::Text { chat_id, text } => transport.send_text(chat_id, text).await,
        OutboundMessage::Photo {
            chat_id,
            photo,
            caption,
        } => {
            transport
                .send_photo(chat_id, photo, caption.as_deref())
                .await
        }
    }
}

/// Deliver a batch, logging failures instead of aborting the batch.
///
/// A dead volunteer channel must not block the reply to the adopter.
pub async fn deliver(transport: &dyn Transport, messages: Vec<OutboundMessage>) {
    for message in &messages {
        if let Err(e) = deliver_one(transport, message).await {
            tracing::error!(chat_id = message.chat_id(), error = %e, "delivery failed");
        }
    }
}
