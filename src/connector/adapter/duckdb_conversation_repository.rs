use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ConversationRepository;
use crate::domain::{Analysis, ConversationRecord, DomainError};

/// Local conversation store for development, backed by a DuckDB file.
///
/// Mirrors the document-store contract: updates touch only the analysis
/// columns, the timestamp is assigned by the database, and updating a missing
/// conversation fails instead of creating it.
pub struct DuckdbConversationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbConversationRepository {
    /// Open (or create) the database file, creating missing parent
    /// directories.
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::persistence(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::persistence(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                latest_analysis_feedback TEXT,
                last_analysis_timestamp BIGINT,
                created_at BIGINT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::persistence(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB conversation schema initialized");
        Ok(())
    }

    fn to_datetime(millis: Option<i64>) -> Option<DateTime<Utc>> {
        millis.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

#[async_trait]
impl ConversationRepository for DuckdbConversationRepository {
    async fn record_analysis(
        &self,
        conversation_id: &str,
        analysis: &Analysis,
    ) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        let updated = conn
            .execute(
                r#"
                UPDATE conversations
                SET latest_analysis_feedback = ?1,
                    last_analysis_timestamp = epoch_ms(now())
                WHERE id = ?2
                "#,
                params![analysis.as_str(), conversation_id],
            )
            .map_err(|e| DomainError::persistence(format!("Failed to store analysis: {}", e)))?;

        if updated == 0 {
            return Err(DomainError::conversation_not_found(conversation_id));
        }

        debug!("Stored analysis for conversation {} in DuckDB", conversation_id);
        Ok(())
    }

    async fn find_by_id(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationRecord>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, latest_analysis_feedback, last_analysis_timestamp FROM conversations WHERE id = ?1",
            )
            .map_err(|e| DomainError::persistence(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![conversation_id], |row| {
            let timestamp: Option<i64> = row.get(2)?;
            Ok(ConversationRecord::reconstitute(
                row.get(0)?,
                row.get(1)?,
                Self::to_datetime(timestamp),
            ))
        }) {
            Ok(record) => Ok(Some(record)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::persistence(format!(
                "Failed to query conversation: {}",
                e
            ))),
        }
    }

    async fn create(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError> {
        let conn = self.conn.lock().await;
        let inserted = conn
            .execute(
                r#"
                INSERT INTO conversations (id, created_at)
                VALUES (?1, epoch_ms(now()))
                ON CONFLICT (id) DO NOTHING
                "#,
                params![conversation_id],
            )
            .map_err(|e| DomainError::persistence(format!("Failed to create conversation: {}", e)))?;

        if inserted == 0 {
            return Err(DomainError::already_exists(format!(
                "Conversation {} already exists",
                conversation_id
            )));
        }

        Ok(ConversationRecord::new(conversation_id))
    }
}
