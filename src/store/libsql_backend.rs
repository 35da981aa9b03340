//! libSQL backend — async `Store` trait implementation.
//!
//! Supports local file and in-memory databases. Timestamps are stored as
//! RFC 3339 text, which also sorts correctly for the `ORDER BY created_at`
//! queries below.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;
use uuid::Uuid;

use crate::dialogue::stage::ConversationStage;
use crate::error::StorageError;
use crate::reports::model::Report;
use crate::shelters::{Animal, Shelter};
use crate::store::migrations;
use crate::store::traits::Store;
use crate::users::{Role, User};

/// libSQL store backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create in-memory database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Volunteer => "volunteer",
        Role::Admin => "admin",
    }
}

fn str_to_role(s: &str) -> Role {
    match s {
        "volunteer" => Role::Volunteer,
        "admin" => Role::Admin,
        _ => Role::User,
    }
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil())
}

const USER_COLUMNS: &str = "id, chat_id, name, phone, role, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, libsql::Error> {
    let id: String = row.get(0)?;
    let chat_id: String = row.get(1)?;
    let name: Option<String> = row.get(2).ok();
    let phone: Option<String> = row.get(3).ok();
    let role: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(User {
        id: parse_uuid(&id),
        chat_id,
        name,
        phone,
        role: str_to_role(&role),
        created_at: parse_datetime(&created_at),
    })
}

const REPORT_COLUMNS: &str =
    "id, user_id, photo_ref, text_body, has_photo, has_text, processed, created_at";

fn row_to_report(row: &libsql::Row) -> Result<Report, libsql::Error> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let photo_ref: Option<String> = row.get(2).ok();
    let text: Option<String> = row.get(3).ok();
    let has_photo: i64 = row.get(4)?;
    let has_text: i64 = row.get(5)?;
    let processed: i64 = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(Report {
        id: parse_uuid(&id),
        user_id: parse_uuid(&user_id),
        photo_ref,
        text,
        has_photo: has_photo != 0,
        has_text: has_text != 0,
        processed: processed != 0,
        created_at: parse_datetime(&created_at),
    })
}

const SHELTER_COLUMNS: &str = "id, name, address, working_hours, contacts, map_url";

fn row_to_shelter(row: &libsql::Row) -> Result<Shelter, libsql::Error> {
    let id: String = row.get(0)?;
    Ok(Shelter {
        id: parse_uuid(&id),
        name: row.get(1)?,
        address: row.get(2)?,
        working_hours: row.get(3)?,
        contacts: row.get(4)?,
        map_url: row.get(5).ok(),
    })
}

fn row_to_animal(row: &libsql::Row) -> Result<Animal, libsql::Error> {
    let id: String = row.get(0)?;
    let shelter_id: String = row.get(1)?;
    Ok(Animal {
        id: parse_uuid(&id),
        shelter_id: parse_uuid(&shelter_id),
        name: row.get(2)?,
        species: row.get(3)?,
        age_years: row.get(4)?,
    })
}

fn query_err(e: libsql::Error) -> StorageError {
    StorageError::Query(e.to_string())
}

// ── Store implementation ────────────────────────────────────────────

#[async_trait]
impl Store for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), StorageError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Users ───────────────────────────────────────────────────────

    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO users (id, chat_id, name, phone, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.id.to_string(),
                    user.chat_id.as_str(),
                    user.name.clone(),
                    user.phone.clone(),
                    role_to_str(user.role),
                    user.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "UPDATE users SET chat_id = ?2, name = ?3, phone = ?4, role = ?5 WHERE id = ?1",
                params![
                    user.id.to_string(),
                    user.chat_id.as_str(),
                    user.name.clone(),
                    user.phone.clone(),
                    role_to_str(user.role),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn user_by_chat(&self, chat_id: &str) -> Result<Option<User>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE chat_id = ?1"),
                params![chat_id],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_user(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_user(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn all_users(&self) -> Result<Vec<User>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"),
                (),
            )
            .await
            .map_err(query_err)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            users.push(row_to_user(&row).map_err(query_err)?);
        }
        Ok(users)
    }

    // ── Conversation stages ─────────────────────────────────────────

    async fn get_stage(
        &self,
        chat_id: &str,
    ) -> Result<Option<ConversationStage>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT stage FROM conversation_stages WHERE chat_id = ?1",
                params![chat_id],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => {
                let stage: String = row.get(0).map_err(query_err)?;
                Ok(Some(ConversationStage::parse_or_idle(&stage)))
            }
            None => Ok(None),
        }
    }

    async fn set_stage(
        &self,
        chat_id: &str,
        stage: ConversationStage,
    ) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO conversation_stages (chat_id, stage, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET stage = ?2, updated_at = ?3",
                params![chat_id, stage.as_str(), Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn clear_stage(&self, chat_id: &str) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "DELETE FROM conversation_stages WHERE chat_id = ?1",
                params![chat_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    // ── Reports ─────────────────────────────────────────────────────

    async fn insert_report(&self, report: &Report) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO reports
                 (id, user_id, photo_ref, text_body, has_photo, has_text, processed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report.id.to_string(),
                    report.user_id.to_string(),
                    report.photo_ref.clone(),
                    report.text.clone(),
                    report.has_photo as i64,
                    report.has_text as i64,
                    report.processed as i64,
                    report.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "UPDATE reports SET photo_ref = ?2, text_body = ?3, has_photo = ?4,
                 has_text = ?5, processed = ?6 WHERE id = ?1",
                params![
                    report.id.to_string(),
                    report.photo_ref.clone(),
                    report.text.clone(),
                    report.has_photo as i64,
                    report.has_text as i64,
                    report.processed as i64,
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_report(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn latest_report_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Report>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = ?1
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![user_id.to_string()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_report(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn pending_reports(&self) -> Result<Vec<Report>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM reports WHERE processed = 0
                     ORDER BY created_at ASC"
                ),
                (),
            )
            .await
            .map_err(query_err)?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            reports.push(row_to_report(&row).map_err(query_err)?);
        }
        Ok(reports)
    }

    // ── Shelter reference data ──────────────────────────────────────

    async fn insert_shelter(&self, shelter: &Shelter) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO shelters (id, name, address, working_hours, contacts, map_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    shelter.id.to_string(),
                    shelter.name.as_str(),
                    shelter.address.as_str(),
                    shelter.working_hours.as_str(),
                    shelter.contacts.as_str(),
                    shelter.map_url.clone(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn insert_animal(&self, animal: &Animal) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO animals (id, shelter_id, name, species, age_years)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    animal.id.to_string(),
                    animal.shelter_id.to_string(),
                    animal.name.as_str(),
                    animal.species.as_str(),
                    animal.age_years,
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn first_shelter(&self) -> Result<Option<Shelter>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SHELTER_COLUMNS} FROM shelters ORDER BY name ASC LIMIT 1"),
                (),
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_shelter(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn animals_for_shelter(&self, shelter_id: Uuid) -> Result<Vec<Animal>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, shelter_id, name, species, age_years FROM animals
                 WHERE shelter_id = ?1 ORDER BY name ASC",
                params![shelter_id.to_string()],
            )
            .await
            .map_err(query_err)?;
        let mut animals = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            animals.push(row_to_animal(&row).map_err(query_err)?);
        }
        Ok(animals)
    }
}
