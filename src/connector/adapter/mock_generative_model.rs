use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::GenerativeModel;
use crate::domain::DomainError;

const DEFAULT_REPLY: &str = "\
Clarity: 4/5 - the ask is explicit.
Assertiveness: 3/5 - firm, but no justification is offered.
Empathy: 2/5 - the counterpart's constraints are not acknowledged.
Anchoring: 3/5 - a concrete number sets the reference point.
Next step: 3/5 - no follow-up is proposed.
Rewrite: \"Given our three-year order history, a 10% discount would let us commit to next quarter's volume today.\"";

/// Offline stand-in for a hosted model: returns a canned reply and records
/// every prompt it receives.
pub struct MockGenerativeModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerativeModel {
    pub fn new() -> Self {
        Self::with_reply(DEFAULT_REPLY)
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

impl Default for MockGenerativeModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for MockGenerativeModel {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().await.push(prompt.to_string());
        debug!("Mock model answering a {} character prompt", prompt.len());
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
