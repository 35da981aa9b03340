//! Inbound events and outbound messages.

/// One resolution variant of an inbound photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    /// Opaque file reference understood by the transport.
    pub file_ref: String,
    /// Size metric used to pick the best variant.
    pub size: i64,
}

/// An inbound event from the messaging transport.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A plain text message.
    Text { chat_id: String, text: String },
    /// A photo message, possibly delivered in several resolutions.
    Photo {
        chat_id: String,
        variants: Vec<PhotoVariant>,
    },
    /// A menu selection carrying an opaque command token.
    Menu { chat_id: String, token: String },
}

impl InboundEvent {
    /// The originating chat id.
    pub fn chat_id(&self) -> &str {
        match self {
            InboundEvent::Text { chat_id, .. }
            | InboundEvent::Photo { chat_id, .. }
            | InboundEvent::Menu { chat_id, .. } => chat_id,
        }
    }
}

/// An outbound message to be delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text {
        chat_id: String,
        text: String,
    },
    Photo {
        chat_id: String,
        /// Photo reference or URL the transport can resolve.
        photo: String,
        caption: Option<String>,
    },
}

impl OutboundMessage {
    pub fn text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        OutboundMessage::Text {
            chat_id: chat_id.into(),
            text: text.into(),
        }
    }

    pub fn photo(
        chat_id: impl Into<String>,
        photo: impl Into<String>,
        caption: Option<&str>,
    ) -> Self {
        OutboundMessage::Photo {
            chat_id: chat_id.into(),
            photo: photo.into(),
            caption: caption.map(str::to_string),
        }
    }

    /// The destination chat id.
    pub fn chat_id(&self) -> &str {
        match self {
            OutboundMessage::Text { chat_id, .. } | OutboundMessage::Photo { chat_id, .. } => {
                chat_id
            }
        }
    }
}

/// Pick the usable variant with the strictly largest size; ties keep the
/// first one encountered. Variants without a file reference are skipped.
pub fn largest_variant(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    let mut best: Option<&PhotoVariant> = None;
    for variant in variants {
        if variant.file_ref.is_empty() {
            continue;
        }
        match best {
            None => best = Some(variant),
            Some(current) if variant.size > current.size => best = Some(variant),
            Some(_) => {}
        }
    }
    best
}
