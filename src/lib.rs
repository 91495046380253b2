pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    AlwaysAnalyze, AnalysisTrigger, AnalyzeMessageUseCase, ConversationRepository,
    GenerativeModel, ManageConversationsUseCase, PromptSource, TriggerDecision,
};

pub use cli::{Commands, ConversationCommand};

pub use connector::{
    AccessTokenProvider, AdcTokenProvider, DuckdbConversationRepository, FilePromptSource,
    FirestoreConversationRepository, GcpSettings, InMemoryConversationRepository,
    MockGenerativeModel, PromptLocation, StaticTokenProvider, VertexAiClient,
};

pub use domain::{
    Analysis, AnalysisOutcome, AnalysisRequest, ConversationRecord, DomainError, PromptTemplate,
    ANALYSIS_MARKER, USER_MESSAGE_PLACEHOLDER,
};
