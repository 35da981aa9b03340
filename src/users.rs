//! Users and the chat-id directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::store::Store;

/// Role of a user within the shelter system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Volunteer,
    Admin,
}

impl Role {
    /// Whether this role may use the report review commands.
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Volunteer | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Volunteer => "volunteer",
            Role::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

/// A known conversation participant.
///
/// Created on the first inbound event from an unseen chat id; never deleted.
/// The phone is validated once on capture and not re-validated on reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stable external chat identifier. Unique per user.
    pub chat_id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh user record for a first-contact chat id.
    pub fn new(chat_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id: chat_id.to_string(),
            name: None,
            phone: None,
            role: Role::User,
            created_at: Utc::now(),
        }
    }
}

/// Look up the user for `chat_id`, creating a `Role::User` record on first
/// contact.
pub async fn resolve_or_create(store: &dyn Store, chat_id: &str) -> Result<User, StorageError> {
    if let Some(user) = store.user_by_chat(chat_id).await? {
        return Ok(user);
    }
    let user = User::new(chat_id);
    store.insert_user(&user).await?;
    tracing::info!(chat_id, user_id = %user.id, "new user registered");
    Ok(user)
}
