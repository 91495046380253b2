use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Prompt unavailable: {0}")]
    PromptUnavailable(String),

    #[error("Malformed AI response: {0}")]
    MalformedAiResponse(String),

    #[error("AI service unavailable: {0}")]
    AiServiceUnavailable(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn prompt_unavailable(msg: impl Into<String>) -> Self {
        Self::PromptUnavailable(msg.into())
    }

    pub fn malformed_ai_response(msg: impl Into<String>) -> Self {
        Self::MalformedAiResponse(msg.into())
    }

    pub fn ai_service_unavailable(msg: impl Into<String>) -> Self {
        Self::AiServiceUnavailable(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    pub fn conversation_not_found(conversation_id: impl Into<String>) -> Self {
        Self::ConversationNotFound(conversation_id.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConversationNotFound(_))
    }

    /// Short, provider-free label for the stage that failed. This is the only
    /// piece of an internal failure that crosses the callable boundary.
    pub fn stage_label(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid argument",
            Self::PromptUnavailable(_) => "prompt unavailable",
            Self::MalformedAiResponse(_) => "malformed AI response",
            Self::AiServiceUnavailable(_) => "AI service unavailable",
            Self::PersistenceFailure(_) => "persistence failure",
            Self::ConversationNotFound(_) => "conversation not found",
            Self::AlreadyExists(_) => "already exists",
            Self::IoError(_) => "internal error",
        }
    }
}
