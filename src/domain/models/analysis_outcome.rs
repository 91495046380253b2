use serde::{Deserialize, Serialize};

/// Result of one orchestrator invocation that did not fail.
///
/// Serializes to the callable result shape: `{"status": "success"}` or
/// `{"status": "skipped", "reason": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success,
    Skipped { reason: String },
}

impl AnalysisOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped { .. } => "skipped",
        }
    }
}
