//! Error types for shelter-assist.

/// Top-level error type for the bot core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Messaging transport errors.
///
/// These are logged and swallowed at delivery time — a failed send never
/// rolls back a state transition the engine already committed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send message to chat {chat_id}: {reason}")]
    SendFailed { chat_id: String, reason: String },
}

/// Result type alias for the bot core.
pub type Result<T> = std::result::Result<T, Error>;
