//! Conversation stages and the per-chat stage store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::Store;

/// The current step of the multi-turn dialogue for one chat.
///
/// Absence of a stored entry is equivalent to `Idle` — the store's `get`
/// makes that explicit by always returning a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Idle,
    AwaitingPhone,
    AwaitingReportPhoto,
    AwaitingReportText,
}

impl ConversationStage {
    /// Stable string form, used as the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStage::Idle => "idle",
            ConversationStage::AwaitingPhone => "awaiting_phone",
            ConversationStage::AwaitingReportPhoto => "awaiting_report_photo",
            ConversationStage::AwaitingReportText => "awaiting_report_text",
        }
    }

    /// Parse the persisted form; anything unknown collapses to `Idle`.
    pub fn parse_or_idle(s: &str) -> Self {
        match s {
            "awaiting_phone" => ConversationStage::AwaitingPhone,
            "awaiting_report_photo" => ConversationStage::AwaitingReportPhoto,
            "awaiting_report_text" => ConversationStage::AwaitingReportText,
            _ => ConversationStage::Idle,
        }
    }
}

impl std::fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyed stage store: one stage per chat id.
///
/// A dumb key-value map — transition legality lives entirely in the
/// dialogue engine.
#[derive(Clone)]
pub struct StageStore {
    store: Arc<dyn Store>,
}

impl StageStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current stage for `chat_id`. Never fails to produce a stage:
    /// an absent entry reads as `Idle`.
    pub async fn get(&self, chat_id: &str) -> Result<ConversationStage, StorageError> {
        Ok(self.store.get_stage(chat_id).await?.unwrap_or_default())
    }

    /// Upsert the stage for `chat_id`.
    pub async fn set(&self, chat_id: &str, stage: ConversationStage) -> Result<(), StorageError> {
        self.store.set_stage(chat_id, stage).await
    }

    /// Delete the entry for `chat_id`; subsequent `get` returns `Idle`.
    pub async fn clear(&self, chat_id: &str) -> Result<(), StorageError> {
        self.store.clear_stage(chat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_stage() {
        for stage in [
            ConversationStage::Idle,
            ConversationStage::AwaitingPhone,
            ConversationStage::AwaitingReportPhoto,
            ConversationStage::AwaitingReportText,
        ] {
            assert_eq!(ConversationStage::parse_or_idle(stage.as_str()), stage);
        }
    }

    #[test]
    fn unknown_string_parses_as_idle() {
        assert_eq!(
            ConversationStage::parse_or_idle("no_such_stage"),
            ConversationStage::Idle
        );
        assert_eq!(ConversationStage::parse_or_idle(""), ConversationStage::Idle);
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(ConversationStage::default(), ConversationStage::Idle);
    }
}
