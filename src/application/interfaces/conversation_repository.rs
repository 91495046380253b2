use async_trait::async_trait;

use crate::domain::{Analysis, ConversationRecord, DomainError};

/// Per-conversation document store.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Overwrite the conversation's latest analysis and stamp it with a
    /// store-assigned time. Other document fields are left untouched.
    ///
    /// The document must already exist; a missing document fails with
    /// [`DomainError::ConversationNotFound`] and nothing is created. Any other
    /// failure is [`DomainError::PersistenceFailure`].
    async fn record_analysis(
        &self,
        conversation_id: &str,
        analysis: &Analysis,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, conversation_id: &str)
        -> Result<Option<ConversationRecord>, DomainError>;

    /// Create an empty conversation document. Fails with
    /// [`DomainError::AlreadyExists`] when the id is taken.
    async fn create(&self, conversation_id: &str) -> Result<ConversationRecord, DomainError>;
}
