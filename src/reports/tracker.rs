//! Report lifecycle tracking.

use std::sync::Arc;

use uuid::Uuid;

use crate::dialogue::event::OutboundMessage;
use crate::dialogue::texts;
use crate::error::StorageError;
use crate::reports::model::Report;
use crate::store::Store;
use crate::users::User;

/// Outcome of a mark-processed request.
///
/// An unknown id is a recoverable condition — the operation is a logged
/// no-op, but the caller can still tell it apart from success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Processed,
    NotFound,
}

/// Tracks per-user report records through partial completion to processed
/// closure.
#[derive(Clone)]
pub struct ReportTracker {
    store: Arc<dyn Store>,
}

impl ReportTracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Insert a new, empty report for `user`. Photo and text arrive later.
    pub async fn create_report(&self, user: &User) -> Result<Report, StorageError> {
        let report = Report::new(user.id);
        self.store.insert_report(&report).await?;
        tracing::info!(report_id = %report.id, user_id = %user.id, "report created");
        Ok(report)
    }

    /// Attach the photo reference and persist with refreshed flags.
    pub async fn attach_photo(
        &self,
        report: &mut Report,
        file_ref: &str,
    ) -> Result<(), StorageError> {
        report.photo_ref = Some(file_ref.to_string());
        report.refresh_flags();
        self.store.update_report(report).await
    }

    /// Attach the text body and persist with refreshed flags.
    pub async fn attach_text(&self, report: &mut Report, text: &str) -> Result<(), StorageError> {
        report.text = Some(text.to_string());
        report.refresh_flags();
        self.store.update_report(report).await
    }

    /// The user's report with the maximum creation timestamp, if any.
    pub async fn latest_report(&self, user: &User) -> Result<Option<Report>, StorageError> {
        self.store.latest_report_for_user(user.id).await
    }

    /// All unprocessed reports, oldest first.
    pub async fn pending_reports(&self) -> Result<Vec<Report>, StorageError> {
        self.store.pending_reports().await
    }

    pub async fn report_by_id(&self, id: Uuid) -> Result<Option<Report>, StorageError> {
        self.store.get_report(id).await
    }

    /// Mark a report processed. Unknown ids log a warning and report
    /// `MarkOutcome::NotFound`; marking twice is safe.
    pub async fn mark_processed(&self, id: Uuid) -> Result<MarkOutcome, StorageError> {
        match self.store.get_report(id).await? {
            Some(mut report) => {
                report.processed = true;
                self.store.update_report(&report).await?;
                tracing::info!(report_id = %id, "report marked processed");
                Ok(MarkOutcome::Processed)
            }
            None => {
                tracing::warn!(report_id = %id, "report not found for processing");
                Ok(MarkOutcome::NotFound)
            }
        }
    }

    /// Compose the invalid-report notification for the report's owner.
    ///
    /// Returns `None` when the report or its owner cannot be resolved;
    /// the caller decides whether that is worth surfacing.
    pub async fn notify_invalid(
        &self,
        id: Uuid,
        message: &str,
    ) -> Result<Option<OutboundMessage>, StorageError> {
        let Some(report) = self.store.get_report(id).await? else {
            tracing::warn!(report_id = %id, "report not found for invalid-report notice");
            return Ok(None);
        };
        let Some(user) = self.store.user_by_id(report.user_id).await? else {
            tracing::warn!(report_id = %id, user_id = %report.user_id, "report owner not found");
            return Ok(None);
        };
        Ok(Some(OutboundMessage::text(
            &user.chat_id,
            format!("{}{message}", texts::INVALID_REPORT_PREFIX),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;

    async fn setup() -> (Arc<dyn Store>, ReportTracker, User) {
        let store: Arc<dyn Store> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let user = User::new("chat-1");
        store.insert_user(&user).await.unwrap();
        (store.clone(), ReportTracker::new(store), user)
    }

    #[tokio::test]
    async fn create_then_fill_lifecycle() {
        let (_store, tracker, user) = setup().await;

        let mut report = tracker.create_report(&user).await.unwrap();
        assert!(!report.has_photo);
        assert!(!report.has_text);
        assert!(!report.processed);

        tracker.attach_photo(&mut report, "file-9").await.unwrap();
        let stored = tracker.report_by_id(report.id).await.unwrap().unwrap();
        assert!(stored.has_photo);
        assert!(!stored.has_text);

        tracker.attach_text(&mut report, "All good").await.unwrap();
        let stored = tracker.report_by_id(report.id).await.unwrap().unwrap();
        assert!(stored.is_complete());
        assert!(!stored.processed);
    }

    #[tokio::test]
    async fn latest_report_tracks_maximum_timestamp() {
        let (store, tracker, user) = setup().await;

        let mut older = Report::new(user.id);
        older.created_at = "2026-08-01T10:00:00Z".parse().unwrap();
        let mut newer = Report::new(user.id);
        newer.created_at = "2026-08-03T10:00:00Z".parse().unwrap();
        let mut middle = Report::new(user.id);
        middle.created_at = "2026-08-02T10:00:00Z".parse().unwrap();

        // Insertion order deliberately does not match timestamp order.
        store.insert_report(&newer).await.unwrap();
        store.insert_report(&older).await.unwrap();
        store.insert_report(&middle).await.unwrap();

        let latest = tracker.latest_report(&user).await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[tokio::test]
    async fn pending_excludes_processed() {
        let (_store, tracker, user) = setup().await;

        let report = tracker.create_report(&user).await.unwrap();
        assert!(
            tracker
                .pending_reports()
                .await
                .unwrap()
                .iter()
                .any(|r| r.id == report.id)
        );

        let outcome = tracker.mark_processed(report.id).await.unwrap();
        assert_eq!(outcome, MarkOutcome::Processed);
        assert!(
            tracker
                .pending_reports()
                .await
                .unwrap()
                .iter()
                .all(|r| r.id != report.id)
        );
    }

    #[tokio::test]
    async fn mark_processed_is_idempotent() {
        let (_store, tracker, user) = setup().await;
        let report = tracker.create_report(&user).await.unwrap();

        assert_eq!(
            tracker.mark_processed(report.id).await.unwrap(),
            MarkOutcome::Processed
        );
        assert_eq!(
            tracker.mark_processed(report.id).await.unwrap(),
            MarkOutcome::Processed
        );
        let stored = tracker.report_by_id(report.id).await.unwrap().unwrap();
        assert!(stored.processed);
    }

    #[tokio::test]
    async fn mark_processed_unknown_id_is_distinguishable_noop() {
        let (_store, tracker, _user) = setup().await;
        assert_eq!(
            tracker.mark_processed(Uuid::new_v4()).await.unwrap(),
            MarkOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn notify_invalid_targets_owner_with_prefix() {
        let (_store, tracker, user) = setup().await;
        let report = tracker.create_report(&user).await.unwrap();

        let message = tracker
            .notify_invalid(report.id, "the photo is too dark.")
            .await
            .unwrap()
            .unwrap();
        match message {
            OutboundMessage::Text { chat_id, text } => {
                assert_eq!(chat_id, user.chat_id);
                assert_eq!(text, "Dear adopter, the photo is too dark.");
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn notify_invalid_unknown_report_yields_nothing() {
        let (_store, tracker, _user) = setup().await;
        assert!(
            tracker
                .notify_invalid(Uuid::new_v4(), "whatever")
                .await
                .unwrap()
                .is_none()
        );
    }
}
