use async_trait::async_trait;

use crate::domain::{DomainError, PromptTemplate};

/// Source of the analysis prompt template.
#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Load the template. Any failure is reported as
    /// [`DomainError::PromptUnavailable`].
    async fn load(&self) -> Result<PromptTemplate, DomainError>;

    /// Human-readable location, for logging.
    fn describe(&self) -> String;
}
