use anyhow::Result;
use tracing::warn;

use crate::{AnalysisOutcome, AnalysisRequest, ConversationRecord};

use super::super::Container;

pub struct AnalyzeController<'a> {
    container: &'a Container,
}

impl<'a> AnalyzeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn analyze(&self, conversation_id: String, message: String) -> Result<String> {
        let use_case = self.container.analyze_use_case();
        let outcome = use_case
            .execute(AnalysisRequest::new(message, conversation_id.as_str()))
            .await?;

        let record = match outcome {
            AnalysisOutcome::Success => {
                match self.container.conversations_use_case().get(&conversation_id).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(
                            conversation_id = %conversation_id,
                            "Analysis stored but could not be read back: {}", e
                        );
                        None
                    }
                }
            }
            AnalysisOutcome::Skipped { .. } => None,
        };

        Ok(self.format_outcome(&outcome, record.as_ref()))
    }

    fn format_outcome(&self, outcome: &AnalysisOutcome, record: Option<&ConversationRecord>) -> String {
        let mut output = format!("Status: {}", outcome.status());

        if let AnalysisOutcome::Skipped { reason } = outcome {
            output.push_str(&format!("\nReason: {}", reason));
        }

        if let Some(feedback) = record.and_then(|r| r.latest_analysis_feedback()) {
            output.push_str(&format!("\n\n{}", feedback));
        }

        output
    }
}
