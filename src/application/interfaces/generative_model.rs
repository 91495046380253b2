use async_trait::async_trait;

use crate::domain::DomainError;

/// Text-in, text-out access to a hosted generative model.
///
/// Implementors encapsulate transport, authentication and the vendor's
/// response envelope. Each call is independent: no streaming and no
/// conversation state is carried between calls.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `prompt` as a single user turn and return the text of the first
    /// candidate.
    ///
    /// Fails with [`DomainError::AiServiceUnavailable`] when the call itself
    /// fails and [`DomainError::MalformedAiResponse`] when the envelope lacks
    /// text at the expected position.
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
