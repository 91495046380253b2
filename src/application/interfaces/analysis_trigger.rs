use crate::domain::AnalysisRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    Analyze,
    Skip { reason: String },
}

impl TriggerDecision {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }
}

/// Decides whether a validated request is analyzed at all.
///
/// Any `Fn(&AnalysisRequest) -> TriggerDecision` closure is a trigger.
pub trait AnalysisTrigger: Send + Sync {
    fn evaluate(&self, request: &AnalysisRequest) -> TriggerDecision;
}

impl<F> AnalysisTrigger for F
where
    F: Fn(&AnalysisRequest) -> TriggerDecision + Send + Sync,
{
    fn evaluate(&self, request: &AnalysisRequest) -> TriggerDecision {
        self(request)
    }
}

/// The default trigger: every request is analyzed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAnalyze;

impl AnalysisTrigger for AlwaysAnalyze {
    fn evaluate(&self, _request: &AnalysisRequest) -> TriggerDecision {
        TriggerDecision::Analyze
    }
}
