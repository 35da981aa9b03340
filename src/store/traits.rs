//! Backend-agnostic persistence trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::dialogue::stage::ConversationStage;
use crate::error::StorageError;
use crate::reports::model::Report;
use crate::shelters::{Animal, Shelter};
use crate::users::User;

/// Single async interface for all persistence: users, conversation stages,
/// reports, and shelter reference data.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), StorageError>;

    // ── Users ───────────────────────────────────────────────────────

    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    async fn update_user(&self, user: &User) -> Result<(), StorageError>;

    /// Look up a user by the external chat identifier.
    async fn user_by_chat(&self, chat_id: &str) -> Result<Option<User>, StorageError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    async fn all_users(&self) -> Result<Vec<User>, StorageError>;

    // ── Conversation stages ─────────────────────────────────────────

    /// Raw stage lookup. `None` means no entry; callers treat that as idle.
    async fn get_stage(&self, chat_id: &str)
    -> Result<Option<ConversationStage>, StorageError>;

    async fn set_stage(
        &self,
        chat_id: &str,
        stage: ConversationStage,
    ) -> Result<(), StorageError>;

    async fn clear_stage(&self, chat_id: &str) -> Result<(), StorageError>;

    // ── Reports ─────────────────────────────────────────────────────

    async fn insert_report(&self, report: &Report) -> Result<(), StorageError>;

    async fn update_report(&self, report: &Report) -> Result<(), StorageError>;

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StorageError>;

    /// The report with the maximum creation timestamp for the user.
    async fn latest_report_for_user(&self, user_id: Uuid)
    -> Result<Option<Report>, StorageError>;

    /// All reports with `processed = false`, oldest first.
    async fn pending_reports(&self) -> Result<Vec<Report>, StorageError>;

    // ── Shelter reference data ──────────────────────────────────────

    async fn insert_shelter(&self, shelter: &Shelter) -> Result<(), StorageError>;

    async fn insert_animal(&self, animal: &Animal) -> Result<(), StorageError>;

    /// The single shelter this deployment serves, if seeded.
    async fn first_shelter(&self) -> Result<Option<Shelter>, StorageError>;

    async fn animals_for_shelter(&self, shelter_id: Uuid) -> Result<Vec<Animal>, StorageError>;
}
