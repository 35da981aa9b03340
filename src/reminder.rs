//! Scheduled staleness sweep over adopters' reports.
//!
//! Once a day (cron-driven) every known user is checked: a user whose
//! newest report is older than the staleness window gets a reminder, and
//! the volunteer channel gets an escalation. Users with no reports at all
//! are escalated with a different text.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::dialogue::event::OutboundMessage;
use crate::dialogue::texts;
use crate::error::Result;
use crate::store::Store;
use crate::transport::{self, Transport};

pub struct ReminderSweeper {
    store: Arc<dyn Store>,
    volunteer_chat_id: String,
    stale_after: Duration,
    /// When set, a user reminded within this window is skipped on the
    /// next sweep. `None` re-fires on every sweep.
    suppress_for: Option<Duration>,
    last_notified: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ReminderSweeper {
    pub fn new(
        store: Arc<dyn Store>,
        volunteer_chat_id: impl Into<String>,
        stale_after_days: i64,
        suppress_hours: Option<u64>,
    ) -> Self {
        Self {
            store,
            volunteer_chat_id: volunteer_chat_id.into(),
            stale_after: Duration::days(stale_after_days),
            suppress_for: suppress_hours.map(|h| Duration::hours(h as i64)),
            last_notified: Mutex::new(HashMap::new()),
        }
    }

    /// One sweep over all users as of `now`. Returns the messages to send.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Vec<OutboundMessage>> {
        let threshold = now - self.stale_after;
        let mut out = Vec::new();
        let mut last_notified = self.last_notified.lock().await;

        for user in self.store.all_users().await? {
            if let (Some(suppress), Some(notified_at)) =
                (self.suppress_for, last_notified.get(&user.chat_id))
            {
                if now - *notified_at < suppress {
                    continue;
                }
            }

            match self.store.latest_report_for_user(user.id).await? {
                Some(report) if report.created_at < threshold => {
                    tracing::info!(chat_id = %user.chat_id, "report overdue, reminding");
                    out.push(OutboundMessage::text(&user.chat_id, texts::REMINDER_STALE));
                    out.push(OutboundMessage::text(
                        &self.volunteer_chat_id,
                        texts::volunteer_stale_escalation(&user.chat_id),
                    ));
                    last_notified.insert(user.chat_id.clone(), now);
                }
                Some(_) => {}
                None => {
                    tracing::info!(chat_id = %user.chat_id, "no reports on record, reminding");
                    out.push(OutboundMessage::text(&user.chat_id, texts::REMINDER_NEVER));
                    out.push(OutboundMessage::text(
                        &self.volunteer_chat_id,
                        texts::volunteer_never_escalation(&user.chat_id),
                    ));
                    last_notified.insert(user.chat_id.clone(), now);
                }
            }
        }

        Ok(out)
    }
}

/// Spawn the background loop that runs a sweep at every cron fire time.
pub fn spawn_sweep_ticker(
    sweeper: Arc<ReminderSweeper>,
    transport: Arc<dyn Transport>,
    schedule: cron::Schedule,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(schedule = %schedule, "Reminder sweep ticker started");
        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                tracing::warn!("Cron schedule has no upcoming fire times; ticker stopping");
                return;
            };
            let wait = (next - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(wait).await;

            match sweeper.sweep(Utc::now()).await {
                Ok(messages) => {
                    transport::deliver(transport.as_ref(), messages).await;
                }
                Err(e) => tracing::error!(error = %e, "reminder sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::model::Report;
    use crate::store::LibSqlBackend;
    use crate::users::User;

    const VOLUNTEER: &str = "@Volunteer";

    async fn store_with_user() -> (Arc<dyn Store>, User) {
        let store: Arc<dyn Store> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let user = User::new("chat-1");
        store.insert_user(&user).await.unwrap();
        (store, user)
    }

    fn now() -> DateTime<Utc> {
        "2026-08-23T20:00:00Z".parse().unwrap()
    }

    async fn insert_report_at(store: &Arc<dyn Store>, user: &User, created_at: &str) {
        let mut report = Report::new(user.id);
        report.created_at = created_at.parse().unwrap();
        store.insert_report(&report).await.unwrap();
    }

    #[tokio::test]
    async fn report_exactly_at_threshold_is_not_stale() {
        let (store, user) = store_with_user().await;
        insert_report_at(&store, &user, "2026-08-21T20:00:00Z").await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, None);
        assert!(sweeper.sweep(now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_past_threshold_reminds_and_escalates() {
        let (store, user) = store_with_user().await;
        insert_report_at(&store, &user, "2026-08-21T19:59:59Z").await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, None);
        let out = sweeper.sweep(now()).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].chat_id(), "chat-1");
        assert_eq!(out[1].chat_id(), VOLUNTEER);
        assert!(matches!(
            &out[0],
            OutboundMessage::Text { text, .. } if text == &texts::REMINDER_STALE
        ));
    }

    #[tokio::test]
    async fn fresh_report_is_left_alone() {
        let (store, user) = store_with_user().await;
        insert_report_at(&store, &user, "2026-08-23T08:00:00Z").await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, None);
        assert!(sweeper.sweep(now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_with_no_reports_gets_distinct_reminder() {
        let (store, _user) = store_with_user().await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, None);
        let out = sweeper.sweep(now()).await.unwrap();

        assert_eq!(out.len(), 2);
        assert!(matches!(
            &out[0],
            OutboundMessage::Text { text, .. } if text == &texts::REMINDER_NEVER
        ));
    }

    #[tokio::test]
    async fn suppression_window_skips_repeat_reminders() {
        let (store, _user) = store_with_user().await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, Some(24));
        assert_eq!(sweeper.sweep(now()).await.unwrap().len(), 2);
        // An hour later, still inside the window.
        let later = now() + Duration::hours(1);
        assert!(sweeper.sweep(later).await.unwrap().is_empty());
        // Past the window, fires again.
        let next_day = now() + Duration::hours(25);
        assert_eq!(sweeper.sweep(next_day).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn without_suppression_every_sweep_fires() {
        let (store, _user) = store_with_user().await;

        let sweeper = ReminderSweeper::new(store, VOLUNTEER, 2, None);
        assert_eq!(sweeper.sweep(now()).await.unwrap().len(), 2);
        assert_eq!(sweeper.sweep(now()).await.unwrap().len(), 2);
    }
}
