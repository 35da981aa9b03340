//! REST endpoints for the volunteer review workflow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::reports::tracker::{MarkOutcome, ReportTracker};
use crate::transport::Transport;

/// Shared state for report review routes.
#[derive(Clone)]
pub struct ReportRouteState {
    pub tracker: ReportTracker,
    pub transport: Arc<dyn Transport>,
}

/// GET /api/reports/pending
///
/// All unprocessed reports, oldest first.
async fn pending(State(state): State<ReportRouteState>) -> impl IntoResponse {
    match state.tracker.pending_reports().await {
        Ok(reports) => Json(reports).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// GET /api/reports/{report_id}
async fn get_report(
    State(state): State<ReportRouteState>,
    Path(report_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tracker.report_by_id(report_id).await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => not_found().into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// POST /api/reports/{report_id}/mark-processed
///
/// Idempotent; an unknown id still answers 404 so the reviewer notices.
async fn mark_processed(
    State(state): State<ReportRouteState>,
    Path(report_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tracker.mark_processed(report_id).await {
        Ok(MarkOutcome::Processed) => {
            Json(serde_json::json!({"outcome": "processed"})).into_response()
        }
        Ok(MarkOutcome::NotFound) => not_found().into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub message: String,
}

/// POST /api/reports/{report_id}/notify
///
/// Sends the adopter a note that their report was filled in badly.
async fn notify(
    State(state): State<ReportRouteState>,
    Path(report_id): Path<Uuid>,
    Json(request): Json<NotifyRequest>,
) -> impl IntoResponse {
    let composed = match state.tracker.notify_invalid(report_id, &request.message).await {
        Ok(Some(message)) => message,
        Ok(None) => return not_found().into_response(),
        Err(e) => return internal_error(e).into_response(),
    };

    match crate::transport::deliver_one(state.transport.as_ref(), &composed).await {
        Ok(()) => Json(serde_json::json!({"outcome": "notified"})).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "report not found"})),
    )
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!(error = %e, "report route failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
}

/// Build the report review routes.
pub fn report_routes(state: ReportRouteState) -> Router {
    Router::new()
        .route("/api/reports/pending", get(pending))
        .route("/api/reports/{report_id}", get(get_report))
        .route("/api/reports/{report_id}/mark-processed", post(mark_processed))
        .route("/api/reports/{report_id}/notify", post(notify))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use tokio::sync::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::store::{LibSqlBackend, Store};
    use crate::users::User;

    /// Records sends instead of talking to a real chat service.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl Transport for RecordingTransport {
        async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn send_photo(
            &self,
            chat_id: &str,
            photo: &str,
            _caption: Option<&str>,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), photo.to_string()));
            Ok(())
        }
    }

    async fn setup() -> (ReportRouteState, Arc<RecordingTransport>, User) {
        let store: Arc<dyn Store> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let user = User::new("chat-7");
        store.insert_user(&user).await.unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let state = ReportRouteState {
            tracker: ReportTracker::new(store),
            transport: transport.clone(),
        };
        (state, transport, user)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn pending_lists_unprocessed_reports() {
        let (state, _transport, user) = setup().await;
        let report = state.tracker.create_report(&user).await.unwrap();

        let response = pending(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], serde_json::json!(report.id));
    }

    #[tokio::test]
    async fn get_report_answers_404_for_unknown_id() {
        let (state, _transport, _user) = setup().await;
        let response = get_report(State(state), Path(Uuid::new_v4()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mark_processed_round_trip() {
        let (state, _transport, user) = setup().await;
        let report = state.tracker.create_report(&user).await.unwrap();

        let response = mark_processed(State(state.clone()), Path(report.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["outcome"], "processed");

        let stored = state.tracker.report_by_id(report.id).await.unwrap().unwrap();
        assert!(stored.processed);
    }

    #[tokio::test]
    async fn mark_processed_unknown_id_is_404() {
        let (state, _transport, _user) = setup().await;
        let response = mark_processed(State(state), Path(Uuid::new_v4()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn notify_delivers_prefixed_message_to_owner() {
        let (state, transport, user) = setup().await;
        let report = state.tracker.create_report(&user).await.unwrap();

        let response = notify(
            State(state),
            Path(report.id),
            Json(NotifyRequest {
                message: "the photo is too dark.".into(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, user.chat_id);
        assert_eq!(sent[0].1, "Dear adopter, the photo is too dark.");
    }

    #[tokio::test]
    async fn notify_unknown_report_is_404_and_sends_nothing() {
        let (state, transport, _user) = setup().await;
        let response = notify(
            State(state),
            Path(Uuid::new_v4()),
            Json(NotifyRequest {
                message: "whatever".into(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(transport.sent.lock().await.is_empty());
    }
}
