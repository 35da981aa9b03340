//! End-to-end run through the report intake flow, from /start to a
//! volunteer marking the report processed.

use std::sync::Arc;

use shelter_assist::dialogue::{ConversationStage, DialogueEngine, InboundEvent, PhotoVariant};
use shelter_assist::reports::tracker::{MarkOutcome, ReportTracker};
use shelter_assist::store::{LibSqlBackend, Store};

async fn stage_of(store: &Arc<dyn Store>, chat_id: &str) -> ConversationStage {
    store
        .get_stage(chat_id)
        .await
        .unwrap()
        .unwrap_or(ConversationStage::Idle)
}

#[tokio::test]
async fn full_report_lifecycle() {
    let store: Arc<dyn Store> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let engine = DialogueEngine::new(store.clone(), "@Volunteer");
    let tracker = ReportTracker::new(store.clone());
    let chat = "555001";

    // New user starts the dialogue and is asked for a phone number.
    engine
        .handle(InboundEvent::Text {
            chat_id: chat.into(),
            text: "/start".into(),
        })
        .await
        .unwrap();
    assert_eq!(stage_of(&store, chat).await, ConversationStage::AwaitingPhone);

    // A valid phone number lands them back in the idle menu.
    engine
        .handle(InboundEvent::Text {
            chat_id: chat.into(),
            text: "+7-923-456-7890".into(),
        })
        .await
        .unwrap();
    assert_eq!(stage_of(&store, chat).await, ConversationStage::Idle);

    let user = store.user_by_chat(chat).await.unwrap().unwrap();
    assert_eq!(user.phone.as_deref(), Some("+7-923-456-7890"));

    // Selecting "send report" creates the record up front.
    engine
        .handle(InboundEvent::Menu {
            chat_id: chat.into(),
            token: "SEND_REPORT".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        stage_of(&store, chat).await,
        ConversationStage::AwaitingReportPhoto
    );
    let report = store.latest_report_for_user(user.id).await.unwrap().unwrap();
    assert!(!report.is_complete());

    // The photo arrives in two resolutions; the larger one sticks.
    engine
        .handle(InboundEvent::Photo {
            chat_id: chat.into(),
            variants: vec![
                PhotoVariant {
                    file_ref: "thumb".into(),
                    size: 150,
                },
                PhotoVariant {
                    file_ref: "full".into(),
                    size: 82_000,
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(
        stage_of(&store, chat).await,
        ConversationStage::AwaitingReportText
    );
    let report = store.latest_report_for_user(user.id).await.unwrap().unwrap();
    assert_eq!(report.photo_ref.as_deref(), Some("full"));

    // The text part completes the report and closes the dialogue.
    engine
        .handle(InboundEvent::Text {
            chat_id: chat.into(),
            text: "Ate twice, slept through the night, no issues.".into(),
        })
        .await
        .unwrap();
    assert_eq!(stage_of(&store, chat).await, ConversationStage::Idle);

    let report = store.latest_report_for_user(user.id).await.unwrap().unwrap();
    assert!(report.is_complete());
    assert!(!report.processed);

    // The volunteer picks it up from the pending queue and closes it out.
    let pending = tracker.pending_reports().await.unwrap();
    assert!(pending.iter().any(|r| r.id == report.id));

    assert_eq!(
        tracker.mark_processed(report.id).await.unwrap(),
        MarkOutcome::Processed
    );
    let pending = tracker.pending_reports().await.unwrap();
    assert!(pending.iter().all(|r| r.id != report.id));

    // Marking again stays a safe no-op.
    assert_eq!(
        tracker.mark_processed(report.id).await.unwrap(),
        MarkOutcome::Processed
    );
}
