use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ConversationRepository;
use crate::domain::{Analysis, ConversationRecord, DomainError};

pub struct InMemoryConversationRepository {
    conversations: Arc<Mutex<HashMap<String, ConversationRecord>>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start with empty documents for each of `ids`.
    pub fn with_conversations<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let conversations = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), ConversationRecord::new(id))
            })
            .collect();
        Self {
            conversations: Arc::new(Mutex::new(conversations)),
        }
    }

    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn record_analysis(
        &self,
        conversation_id: &str,
        analysis: &Analysis,
    ) -> Result<(), DomainError> {
        let mut conversations = self.conversations.lock().await;
        let record = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| DomainError::conversation_not_found(conversation_id))?;

        record.record_analysis(analysis.as_str(), Utc::now());
        debug!("Stored analysis for conversation {} in memory", conversation_id);
        Ok(())
    }

    async fn find_by_id(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationRecord>, DomainError> {
        Ok(self.conversations.lock().await.get(conversation_id).cloned())
    }

    async fn create(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError> {
        let mut conversations = self.conversations.lock().await;
        if conversations.contains_key(conversation_id) {
            return Err(DomainError::already_exists(format!(
                "Conversation {} already exists",
                conversation_id
            )));
        }

        let record = ConversationRecord::new(conversation_id);
        conversations.insert(conversation_id.to_string(), record.clone());
        Ok(record)
    }
}
