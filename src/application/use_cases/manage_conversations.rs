use std::sync::Arc;

use tracing::info;

use crate::application::ConversationRepository;
use crate::domain::{validate_conversation_id, ConversationRecord, DomainError};

/// Create and inspect conversation documents from the command line.
pub struct ManageConversationsUseCase {
    conversations: Arc<dyn ConversationRepository>,
}

impl ManageConversationsUseCase {
    pub fn new(conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { conversations }
    }

    pub async fn create(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError> {
        validate_conversation_id(conversation_id)?;

        let record = self.conversations.create(conversation_id).await?;
        info!(conversation_id, "Conversation created");
        Ok(record)
    }

    pub async fn get(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError> {
        self.conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| DomainError::conversation_not_found(conversation_id))
    }
}
