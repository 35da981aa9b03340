//! Daily report records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A two-part (photo + text) daily report about an adopted animal.
///
/// Created eagerly when the user selects "send report" — the record exists
/// in an incomplete state while the photo and text arrive across turns, so
/// a restart mid-dialogue loses nothing already captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    /// Owning user. Reports accumulate per user, ordered by `created_at`.
    pub user_id: Uuid,
    pub photo_ref: Option<String>,
    pub text: Option<String>,
    /// True iff `photo_ref` is non-empty. Derived; kept in sync on save.
    pub has_photo: bool,
    /// True iff `text` is non-empty. Derived; kept in sync on save.
    pub has_text: bool,
    /// Set only by an external reviewer, never by the dialogue engine.
    pub processed: bool,
    /// Set once, at record creation.
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// A fresh, empty, unprocessed report owned by `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            photo_ref: None,
            text: None,
            has_photo: false,
            has_text: false,
            processed: false,
            created_at: Utc::now(),
        }
    }

    /// Recompute the derived completeness flags from the stored fields.
    pub fn refresh_flags(&mut self) {
        self.has_photo = self.photo_ref.as_deref().is_some_and(|p| !p.is_empty());
        self.has_text = self.text.as_deref().is_some_and(|t| !t.is_empty());
    }

    /// Both parts present. Completeness does not imply `processed`.
    pub fn is_complete(&self) -> bool {
        self.has_photo && self.has_text
    }
}
