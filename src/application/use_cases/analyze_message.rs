use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::{
    AlwaysAnalyze, AnalysisTrigger, ConversationRepository, GenerativeModel, PromptSource,
    TriggerDecision,
};
use crate::domain::{Analysis, AnalysisOutcome, AnalysisRequest, DomainError};

/// Use case behind the `analyzeNegotiationMessage` callable.
///
/// Validates the request, fills the prompt template, asks the model for an
/// analysis and writes it to the conversation's document. The three external
/// calls run strictly one after another and nothing is retried.
pub struct AnalyzeMessageUseCase {
    prompt_source: Arc<dyn PromptSource>,
    model: Arc<dyn GenerativeModel>,
    conversations: Arc<dyn ConversationRepository>,
    trigger: Arc<dyn AnalysisTrigger>,
}

impl AnalyzeMessageUseCase {
    pub fn new(
        prompt_source: Arc<dyn PromptSource>,
        model: Arc<dyn GenerativeModel>,
        conversations: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            prompt_source,
            model,
            conversations,
            trigger: Arc::new(AlwaysAnalyze),
        }
    }

    pub fn with_trigger(mut self, trigger: Arc<dyn AnalysisTrigger>) -> Self {
        self.trigger = trigger;
        self
    }

    pub async fn execute(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, DomainError> {
        if let Err(e) = request.validate() {
            warn!("Rejected analysis request: {}", e);
            return Err(e);
        }

        let span = info_span!(
            "analyze_message",
            conversation_id = %request.conversation_id(),
            invocation_id = %Uuid::new_v4(),
        );
        self.run(&request).instrument(span).await
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, DomainError> {
        let conversation_id = request.conversation_id();
        let start_time = Instant::now();

        info!(
            conversation_id,
            message_chars = request.message().chars().count(),
            "Analysis requested"
        );

        if let TriggerDecision::Skip { reason } = self.trigger.evaluate(request) {
            info!(conversation_id, reason = %reason, "Analysis skipped");
            return Ok(AnalysisOutcome::skipped(reason));
        }

        let template = self.prompt_source.load().await.map_err(|e| {
            error!(
                conversation_id,
                source = %self.prompt_source.describe(),
                "Failed to load prompt template: {}",
                e
            );
            e
        })?;
        if !template.has_placeholder() {
            warn!(
                conversation_id,
                "Prompt template has no message placeholder; the message will not reach the model"
            );
        }
        let prompt = template.fill(request.message());
        info!(conversation_id, prompt_chars = prompt.len(), "Prompt prepared");

        let raw = self.model.generate(&prompt).await.map_err(|e| {
            error!(
                conversation_id,
                model = %self.model.model_name(),
                "AI analysis failed: {}",
                e
            );
            e
        })?;
        let analysis = Analysis::from_model_output(raw);
        info!(
            conversation_id,
            model = %self.model.model_name(),
            analysis_chars = analysis.as_str().len(),
            "Analysis received"
        );

        self.conversations
            .record_analysis(conversation_id, &analysis)
            .await
            .map_err(|e| {
                error!(conversation_id, "Failed to store analysis: {}", e);
                e
            })?;

        info!(
            conversation_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Analysis stored"
        );

        Ok(AnalysisOutcome::Success)
    }
}
