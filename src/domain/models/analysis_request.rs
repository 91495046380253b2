use serde::{Deserialize, Serialize};

use crate::domain::{validate_conversation_id, DomainError};

/// A single invocation's input: the user's chat message and the conversation
/// it belongs to.
///
/// Missing fields deserialize as empty strings so that absent and empty
/// values are rejected by the same [`AnalysisRequest::validate`] path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_id: String,
}

impl AnalysisRequest {
    pub fn new(message: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: conversation_id.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Reject requests lacking a message or a conversation id, or whose id
    /// cannot name a conversation document. Whitespace-only values count as
    /// missing.
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing_message = self.message.trim().is_empty();
        let missing_conversation = self.conversation_id.trim().is_empty();

        match (missing_message, missing_conversation) {
            (false, false) => validate_conversation_id(&self.conversation_id),
            (true, true) => Err(DomainError::invalid_argument(
                "The function must be called with a \"message\" and a \"conversationId\".",
            )),
            (true, false) => Err(DomainError::invalid_argument(
                "The function must be called with a non-empty \"message\".",
            )),
            (false, true) => Err(DomainError::invalid_argument(
                "The function must be called with a non-empty \"conversationId\".",
            )),
        }
    }
}
