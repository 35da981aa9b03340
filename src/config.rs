//! Configuration, read from the environment.

use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default cron expression for the nightly reminder sweep (20:00 every day).
pub const DEFAULT_REMINDER_CRON: &str = "0 0 20 * * *";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// Chat that receives volunteer escalations.
    pub volunteer_chat_id: String,
    /// Path to the local database file.
    pub db_path: String,
    /// Port for the report review REST API.
    pub http_port: u16,
    /// Cron expression driving the reminder sweep.
    pub reminder_cron: String,
    /// A report older than this many days counts as stale.
    pub report_stale_after_days: i64,
    /// When set, skip re-reminding a user within this many hours.
    /// Unset reproduces the escalating re-fire behavior of every sweep.
    pub reminder_suppress_hours: Option<u64>,
}

impl BotConfig {
    /// Read configuration from the environment.
    ///
    /// Only `SHELTER_BOT_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("SHELTER_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SHELTER_BOT_TOKEN".into()))?;

        let volunteer_chat_id =
            std::env::var("SHELTER_VOLUNTEER_CHAT").unwrap_or_else(|_| "@Volunteer".to_string());

        let db_path = std::env::var("SHELTER_DB_PATH")
            .unwrap_or_else(|_| "./data/shelter-assist.db".to_string());

        let http_port = parse_env("SHELTER_HTTP_PORT", 8080u16)?;

        let reminder_cron = std::env::var("SHELTER_REMINDER_CRON")
            .unwrap_or_else(|_| DEFAULT_REMINDER_CRON.to_string());
        cron::Schedule::from_str(&reminder_cron).map_err(|e| ConfigError::InvalidValue {
            key: "SHELTER_REMINDER_CRON".into(),
            message: e.to_string(),
        })?;

        let report_stale_after_days = parse_env("SHELTER_REPORT_STALE_DAYS", 2i64)?;

        let reminder_suppress_hours = match std::env::var("SHELTER_REMINDER_SUPPRESS_HOURS") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "SHELTER_REMINDER_SUPPRESS_HOURS".into(),
                message: e.to_string(),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            volunteer_chat_id,
            db_path,
            http_port,
            reminder_cron,
            report_stale_after_days,
            reminder_suppress_hours,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cron_parses() {
        assert!(cron::Schedule::from_str(DEFAULT_REMINDER_CRON).is_ok());
    }
}
