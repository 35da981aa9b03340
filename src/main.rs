use std::str::FromStr;
use std::sync::Arc;

use futures::StreamExt;
use secrecy::ExposeSecret;

use shelter_assist::config::BotConfig;
use shelter_assist::dialogue::{ChatLocks, DialogueEngine};
use shelter_assist::reminder::{self, ReminderSweeper};
use shelter_assist::reports::routes::{ReportRouteState, report_routes};
use shelter_assist::reports::tracker::ReportTracker;
use shelter_assist::store::{LibSqlBackend, Store};
use shelter_assist::transport::{self, TelegramTransport, Transport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("🐾 Shelter Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Reports API: http://0.0.0.0:{}/api/reports/pending", config.http_port);
    eprintln!("   Reminder cron: {}", config.reminder_cron);

    // ── Database ─────────────────────────────────────────────────────
    let db_path = std::path::Path::new(&config.db_path);
    let store: Arc<dyn Store> = Arc::new(LibSqlBackend::new_local(db_path).await?);
    eprintln!("   Database: {}", config.db_path);

    // ── Transport ────────────────────────────────────────────────────
    let telegram = Arc::new(TelegramTransport::new(
        config.bot_token.expose_secret().to_string(),
    ));
    let transport: Arc<dyn Transport> = telegram.clone();

    // ── Review API ───────────────────────────────────────────────────
    let tracker = ReportTracker::new(store.clone());
    let app = report_routes(ReportRouteState {
        tracker,
        transport: transport.clone(),
    });
    let http_port = config.http_port;
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{http_port}")).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(port = http_port, error = %e, "Failed to bind reports API port");
                return;
            }
        };
        tracing::info!(port = http_port, "Reports API started");
        axum::serve(listener, app).await.ok();
    });

    // ── Reminder sweep ───────────────────────────────────────────────
    let schedule = cron::Schedule::from_str(&config.reminder_cron)?;
    let sweeper = Arc::new(ReminderSweeper::new(
        store.clone(),
        config.volunteer_chat_id.clone(),
        config.report_stale_after_days,
        config.reminder_suppress_hours,
    ));
    let _sweep_handle = reminder::spawn_sweep_ticker(sweeper, transport.clone(), schedule);

    // ── Dialogue loop ────────────────────────────────────────────────
    let engine = Arc::new(DialogueEngine::new(
        store.clone(),
        config.volunteer_chat_id.clone(),
    ));
    let locks = Arc::new(ChatLocks::new());

    let mut events = telegram.start();
    while let Some(event) = events.next().await {
        let engine = engine.clone();
        let transport = transport.clone();
        let locks = locks.clone();
        tokio::spawn(async move {
            // One event at a time per chat; other chats are unaffected.
            let _guard = locks.acquire(event.chat_id()).await;
            match engine.handle(event).await {
                Ok(messages) => transport::deliver(transport.as_ref(), messages).await,
                Err(e) => tracing::error!(error = %e, "event handling failed"),
            }
        });
    }

    Ok(())
}
