use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::application::ConversationRepository;
use crate::connector::adapter::gcp::http_client;
use crate::connector::adapter::{AccessTokenProvider, GcpSettings};
use crate::domain::{
    validate_conversation_id, Analysis, ConversationRecord, DomainError, CONVERSATIONS_COLLECTION,
    LAST_ANALYSIS_TIMESTAMP_FIELD, LATEST_ANALYSIS_FIELD,
};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    string_value: Option<String>,
    timestamp_value: Option<DateTime<Utc>>,
}

/// Conversation documents in Cloud Firestore, through the v1 REST API.
///
/// Analysis writes go through `documents:commit` so the field update, the
/// server timestamp transform and the "document must exist" precondition are
/// applied atomically by Firestore.
///
/// When `FIRESTORE_EMULATOR_HOST` is set, [`FirestoreConversationRepository::from_env`]
/// targets the local emulator instead of production.
pub struct FirestoreConversationRepository {
    client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
    base_url: String,
    project_id: String,
    database: String,
}

impl FirestoreConversationRepository {
    pub fn new(settings: &GcpSettings, token_provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            token_provider,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: settings.project_id().unwrap_or_default().to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Like [`FirestoreConversationRepository::new`], with overrides read
    /// from the process environment.
    pub fn from_env(settings: &GcpSettings, token_provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self::from_lookup(settings, token_provider, |key| std::env::var(key).ok())
    }

    /// Apply overrides found through `lookup`:
    ///
    /// | Variable                  | Purpose                                      |
    /// |---------------------------|----------------------------------------------|
    /// | `FIRESTORE_EMULATOR_HOST` | `host:port` of a local emulator (wins)       |
    /// | `FIRESTORE_BASE_URL`      | Endpoint base                                |
    /// | `FIRESTORE_DATABASE`      | Database id, default `(default)`             |
    pub fn from_lookup(
        settings: &GcpSettings,
        token_provider: Arc<dyn AccessTokenProvider>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut repo = Self::new(settings, token_provider);
        if let Some(host) = lookup("FIRESTORE_EMULATOR_HOST") {
            repo = repo.with_base_url(format!("http://{host}"));
        } else if let Some(base_url) = lookup("FIRESTORE_BASE_URL") {
            repo = repo.with_base_url(base_url);
        }
        if let Some(database) = lookup("FIRESTORE_DATABASE").filter(|d| !d.trim().is_empty()) {
            repo = repo.with_database(database);
        }
        repo
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    fn collection_path(&self) -> String {
        format!("{}/documents/{}", self.database_path(), CONVERSATIONS_COLLECTION)
    }

    fn document_name(&self, conversation_id: &str) -> Result<String, DomainError> {
        validate_conversation_id(conversation_id)?;
        Ok(format!("{}/{}", self.collection_path(), conversation_id))
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.base_url, resource)
    }

    /// URL of one document, with the id percent-encoded as a single path
    /// segment.
    fn document_url(&self, conversation_id: &str) -> Result<Url, DomainError> {
        validate_conversation_id(conversation_id)?;
        let mut url = Url::parse(&self.url(&self.collection_path())).map_err(|e| {
            DomainError::persistence(format!("FirestoreConversationRepository: invalid base URL: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::persistence("FirestoreConversationRepository: base URL cannot hold a path")
            })?
            .push(conversation_id);
        Ok(url)
    }

    fn commit_body(document_name: &str, analysis: &Analysis) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": document_name,
                    "fields": {
                        LATEST_ANALYSIS_FIELD: { "stringValue": analysis.as_str() }
                    }
                },
                "updateMask": { "fieldPaths": [LATEST_ANALYSIS_FIELD] },
                "updateTransforms": [{
                    "fieldPath": LAST_ANALYSIS_TIMESTAMP_FIELD,
                    "setToServerValue": "REQUEST_TIME"
                }],
                "currentDocument": { "exists": true }
            }]
        })
    }

    fn to_record(conversation_id: &str, document: Document) -> ConversationRecord {
        let mut fields = document.fields;
        let feedback = fields
            .remove(LATEST_ANALYSIS_FIELD)
            .and_then(|v| v.string_value);
        let timestamp = fields
            .remove(LAST_ANALYSIS_TIMESTAMP_FIELD)
            .and_then(|v| v.timestamp_value);
        ConversationRecord::reconstitute(conversation_id.to_string(), feedback, timestamp)
    }

    async fn bearer_token(&self) -> Result<String, DomainError> {
        if self.project_id.is_empty() {
            return Err(DomainError::persistence(
                "FirestoreConversationRepository: no GCP project id configured",
            ));
        }
        self.token_provider
            .access_token()
            .await
            .map_err(|e| DomainError::persistence(format!("FirestoreConversationRepository: {e}")))
    }

    async fn failure(response: reqwest::Response, action: &str) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("FirestoreConversationRepository: {action} returned {status}: {body}");
        DomainError::persistence(format!(
            "FirestoreConversationRepository: {action} returned {status}"
        ))
    }
}

#[async_trait]
impl ConversationRepository for FirestoreConversationRepository {
    async fn record_analysis(
        &self,
        conversation_id: &str,
        analysis: &Analysis,
    ) -> Result<(), DomainError> {
        let document_name = self.document_name(conversation_id)?;
        let token = self.bearer_token().await?;

        let response = self
            .client
            .post(self.url(&format!("{}/documents:commit", self.database_path())))
            .bearer_auth(token)
            .json(&Self::commit_body(&document_name, analysis))
            .send()
            .await
            .map_err(|e| {
                DomainError::persistence(format!("FirestoreConversationRepository: commit failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => {
                debug!("Stored analysis for conversation {} in Firestore", conversation_id);
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(DomainError::conversation_not_found(conversation_id)),
            _ => Err(Self::failure(response, "commit").await),
        }
    }

    async fn find_by_id(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationRecord>, DomainError> {
        let document_url = self.document_url(conversation_id)?;
        let token = self.bearer_token().await?;

        let response = self
            .client
            .get(document_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                DomainError::persistence(format!("FirestoreConversationRepository: get failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => {
                let document: Document = response.json().await.map_err(|e| {
                    DomainError::persistence(format!(
                        "FirestoreConversationRepository: failed to decode document: {e}"
                    ))
                })?;
                Ok(Some(Self::to_record(conversation_id, document)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::failure(response, "get").await),
        }
    }

    async fn create(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError> {
        validate_conversation_id(conversation_id)?;
        let token = self.bearer_token().await?;

        let response = self
            .client
            .post(self.url(&self.collection_path()))
            .query(&[("documentId", conversation_id)])
            .bearer_auth(token)
            .json(&json!({ "fields": {} }))
            .send()
            .await
            .map_err(|e| {
                DomainError::persistence(format!("FirestoreConversationRepository: create failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => Ok(ConversationRecord::new(conversation_id)),
            StatusCode::CONFLICT => Err(DomainError::already_exists(format!(
                "Conversation {} already exists",
                conversation_id
            ))),
            _ => Err(Self::failure(response, "create").await),
        }
    }
}
