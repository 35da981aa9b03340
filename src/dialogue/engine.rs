//! The dialogue engine — turns inbound events into stage transitions,
//! report mutations, and outbound messages.
//!
//! The engine is stateless between invocations; all shared state lives in
//! the store. It never talks to the transport directly: `handle` returns
//! the outbound messages and the caller delivers them, so a failed send
//! can never abort a transition already committed.

use std::sync::Arc;

use crate::dialogue::command::MenuCommand;
use crate::dialogue::event::{self, InboundEvent, OutboundMessage, PhotoVariant};
use crate::dialogue::stage::{ConversationStage, StageStore};
use crate::dialogue::texts;
use crate::error::Result;
use crate::phone;
use crate::reports::tracker::ReportTracker;
use crate::shelters;
use crate::store::Store;
use crate::users::{self, User};

/// Orchestrates the intake dialogue for every chat.
pub struct DialogueEngine {
    store: Arc<dyn Store>,
    stages: StageStore,
    tracker: ReportTracker,
    volunteer_chat_id: String,
}

impl DialogueEngine {
    pub fn new(store: Arc<dyn Store>, volunteer_chat_id: impl Into<String>) -> Self {
        Self {
            stages: StageStore::new(store.clone()),
            tracker: ReportTracker::new(store.clone()),
            store,
            volunteer_chat_id: volunteer_chat_id.into(),
        }
    }

    /// Handle one inbound event.
    ///
    /// Stage transitions are written only after the corresponding report
    /// mutation succeeded; recoverable problems come back as user-visible
    /// messages with the stage left as it was.
    pub async fn handle(&self, event: InboundEvent) -> Result<Vec<OutboundMessage>> {
        match event {
            InboundEvent::Text { chat_id, text } => self.handle_text(&chat_id, &text).await,
            InboundEvent::Photo { chat_id, variants } => {
                self.handle_photo(&chat_id, &variants).await
            }
            InboundEvent::Menu { chat_id, token } => self.handle_menu(&chat_id, &token).await,
        }
    }

    // ── Text messages ───────────────────────────────────────────────

    async fn handle_text(&self, chat_id: &str, text: &str) -> Result<Vec<OutboundMessage>> {
        // /start restarts the dialogue from any stage.
        if text.trim().eq_ignore_ascii_case(texts::START_COMMAND) {
            return self.process_start(chat_id).await;
        }

        match self.stages.get(chat_id).await? {
            ConversationStage::AwaitingPhone => self.process_phone(chat_id, text).await,
            ConversationStage::AwaitingReportText => {
                self.process_report_text(chat_id, text).await
            }
            ConversationStage::Idle | ConversationStage::AwaitingReportPhoto => {
                Ok(vec![OutboundMessage::text(chat_id, texts::MENU_FALLBACK)])
            }
        }
    }

    async fn process_start(&self, chat_id: &str) -> Result<Vec<OutboundMessage>> {
        let user = users::resolve_or_create(self.store.as_ref(), chat_id).await?;

        let mut out = Vec::new();
        if user.phone.is_none() {
            out.push(OutboundMessage::text(chat_id, texts::WELCOME_NEW));
            self.stages
                .set(chat_id, ConversationStage::AwaitingPhone)
                .await?;
        } else {
            out.push(OutboundMessage::text(chat_id, texts::WELCOME_BACK));
            self.stages.clear(chat_id).await?;
        }
        out.push(OutboundMessage::text(chat_id, texts::main_menu_text()));
        Ok(out)
    }

    async fn process_phone(&self, chat_id: &str, text: &str) -> Result<Vec<OutboundMessage>> {
        if !phone::is_valid_phone(text.trim()) {
            // Re-prompt; stage stays AwaitingPhone.
            return Ok(vec![OutboundMessage::text(chat_id, texts::PHONE_INVALID)]);
        }

        let Some(mut user) = self.store.user_by_chat(chat_id).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::USER_MISSING)]);
        };
        user.phone = Some(text.trim().to_string());
        self.store.update_user(&user).await?;
        self.stages.clear(chat_id).await?;

        tracing::info!(chat_id, "phone number captured");
        Ok(vec![
            OutboundMessage::text(chat_id, texts::PHONE_ACCEPTED),
            OutboundMessage::text(chat_id, texts::main_menu_text()),
        ])
    }

    async fn process_report_text(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<Vec<OutboundMessage>> {
        let Some(user) = self.store.user_by_chat(chat_id).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::USER_MISSING)]);
        };
        let Some(mut report) = self.tracker.latest_report(&user).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::REPORT_MISSING)]);
        };

        self.tracker.attach_text(&mut report, text).await?;
        self.stages.clear(chat_id).await?;

        tracing::info!(chat_id, report_id = %report.id, "report text attached");
        Ok(vec![
            OutboundMessage::text(chat_id, texts::REPORT_THANKS),
            OutboundMessage::text(chat_id, texts::main_menu_text()),
        ])
    }

    // ── Photo messages ──────────────────────────────────────────────

    async fn handle_photo(
        &self,
        chat_id: &str,
        variants: &[PhotoVariant],
    ) -> Result<Vec<OutboundMessage>> {
        if self.stages.get(chat_id).await? != ConversationStage::AwaitingReportPhoto {
            // Outside the report flow photos are ignored, matching the
            // no-text-message inbound path.
            tracing::debug!(chat_id, "photo received outside report flow, ignoring");
            return Ok(Vec::new());
        }

        let Some(user) = self.store.user_by_chat(chat_id).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::USER_MISSING)]);
        };
        let Some(mut report) = self.tracker.latest_report(&user).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::REPORT_MISSING)]);
        };
        let Some(variant) = event::largest_variant(variants) else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::PHOTO_UNREADABLE)]);
        };

        self.tracker.attach_photo(&mut report, &variant.file_ref).await?;
        self.stages
            .set(chat_id, ConversationStage::AwaitingReportText)
            .await?;

        tracing::info!(chat_id, report_id = %report.id, "report photo attached");
        Ok(vec![OutboundMessage::text(chat_id, texts::REPORT_TEXT_PROMPT)])
    }

    // ── Menu selections ─────────────────────────────────────────────

    async fn handle_menu(&self, chat_id: &str, token: &str) -> Result<Vec<OutboundMessage>> {
        let Some(command) = MenuCommand::from_token(token) else {
            tracing::warn!(chat_id, token, "unknown menu token");
            return Ok(vec![OutboundMessage::text(chat_id, texts::UNKNOWN_COMMAND)]);
        };
        let Some(user) = self.store.user_by_chat(chat_id).await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::UNKNOWN_USER)]);
        };

        // A menu selection aborts whatever multi-turn exchange was active.
        self.stages.clear(chat_id).await?;

        match command {
            MenuCommand::InfoShelterDog | MenuCommand::InfoShelterCat => {
                self.shelter_info(chat_id).await
            }
            MenuCommand::HowToAdoptDog | MenuCommand::HowToAdoptCat => {
                self.adoption_guide(chat_id).await
            }
            MenuCommand::SendReport => self.start_report(&user, chat_id).await,
            MenuCommand::CallVolunteer => Ok(self.call_volunteer(chat_id)),
            MenuCommand::AdoptionDashboard | MenuCommand::VolunteerDashboard => {
                self.reviewer_dashboard(&user, chat_id).await
            }
            MenuCommand::ReviewReport => Ok(self.review_hint(&user, chat_id)),
        }
    }

    async fn start_report(&self, user: &User, chat_id: &str) -> Result<Vec<OutboundMessage>> {
        // Report first, stage second: the stage only advances once the
        // empty record exists.
        self.tracker.create_report(user).await?;
        self.stages
            .set(chat_id, ConversationStage::AwaitingReportPhoto)
            .await?;
        Ok(vec![OutboundMessage::text(chat_id, texts::REPORT_PHOTO_PROMPT)])
    }

    async fn shelter_info(&self, chat_id: &str) -> Result<Vec<OutboundMessage>> {
        let Some(shelter) = self.store.first_shelter().await? else {
            return Ok(vec![OutboundMessage::text(chat_id, texts::SHELTER_INFO_MISSING)]);
        };

        let mut out = vec![OutboundMessage::text(
            chat_id,
            shelters::shelter_info_text(&shelter),
        )];
        if let Some(url) = shelter.map_url.as_deref().filter(|u| !u.is_empty()) {
            out.push(OutboundMessage::photo(chat_id, url, Some(texts::MAP_CAPTION)));
        }
        out.push(OutboundMessage::text(chat_id, texts::CONTACT_FOLLOWUP));
        out.push(OutboundMessage::text(chat_id, texts::main_menu_text()));
        Ok(out)
    }

    async fn adoption_guide(&self, chat_id: &str) -> Result<Vec<OutboundMessage>> {
        let animals = match self.store.first_shelter().await? {
            Some(shelter) => self.store.animals_for_shelter(shelter.id).await?,
            None => Vec::new(),
        };
        Ok(vec![
            OutboundMessage::text(chat_id, shelters::adoption_guide_text(&animals)),
            OutboundMessage::text(chat_id, texts::main_menu_text()),
        ])
    }

    fn call_volunteer(&self, chat_id: &str) -> Vec<OutboundMessage> {
        tracing::info!(chat_id, "volunteer called");
        vec![
            OutboundMessage::text(chat_id, texts::volunteer_ack(&self.volunteer_chat_id)),
            OutboundMessage::text(
                &self.volunteer_chat_id,
                texts::volunteer_help_escalation(chat_id),
            ),
        ]
    }

    async fn reviewer_dashboard(
        &self,
        user: &User,
        chat_id: &str,
    ) -> Result<Vec<OutboundMessage>> {
        if !user.role.can_review() {
            return Ok(vec![OutboundMessage::text(chat_id, texts::RESERVED_COMMAND)]);
        }
        let pending = self.tracker.pending_reports().await?;
        Ok(vec![OutboundMessage::text(
            chat_id,
            texts::dashboard_summary(pending.len()),
        )])
    }

    fn review_hint(&self, user: &User, chat_id: &str) -> Vec<OutboundMessage> {
        if !user.role.can_review() {
            return vec![OutboundMessage::text(chat_id, texts::RESERVED_COMMAND)];
        }
        vec![OutboundMessage::text(chat_id, texts::REVIEW_HINT)]
    }
}
