use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use tracing::{debug, error, warn};

use crate::application::{
    AnalyzeMessageUseCase, ConversationRepository, GenerativeModel, ManageConversationsUseCase,
    PromptSource,
};
use crate::connector::adapter::{
    AccessTokenProvider, AdcTokenProvider, DuckdbConversationRepository, FilePromptSource,
    FirestoreConversationRepository, GcpSettings, InMemoryConversationRepository,
    MockGenerativeModel, PromptLocation, StaticTokenProvider, VertexAiClient,
};

/// Backend holding conversation documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConversationStore {
    #[default]
    Firestore,
    Duckdb,
    Memory,
}

impl ConversationStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStore::Firestore => "firestore",
            ConversationStore::Duckdb => "duckdb",
            ConversationStore::Memory => "memory",
        }
    }
}

pub struct ContainerConfig {
    pub data_dir: String,
    /// Explicit prompt template path. Falls back to `PROMPT_TEMPLATE_PATH`.
    pub prompt_path: Option<String>,
    pub store: ConversationStore,
    /// Answer with a canned analysis instead of calling Vertex AI.
    pub mock_model: bool,
    /// Vertex AI model override.
    pub model: Option<String>,
    /// Conversations the memory store starts with.
    pub seed_conversations: Vec<String>,
}

/// Constructed-once handles shared by every invocation.
pub struct Container {
    prompt_source: Arc<dyn PromptSource>,
    model: Arc<dyn GenerativeModel>,
    conversations: Arc<dyn ConversationRepository>,
    gcp: GcpSettings,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let gcp = GcpSettings::from_env();
        let needs_project = !config.mock_model || config.store == ConversationStore::Firestore;
        if gcp.project_id().is_none() && needs_project {
            error!(
                "No GCP project id configured (GOOGLE_CLOUD_PROJECT, GCLOUD_PROJECT or FIREBASE_CONFIG); \
                 analysis requests will fail"
            );
        }

        let token_provider: Arc<dyn AccessTokenProvider> = match std::env::var("GCP_ACCESS_TOKEN") {
            Ok(token) => {
                debug!("Using static GCP access token from GCP_ACCESS_TOKEN");
                Arc::new(StaticTokenProvider::new(token))
            }
            Err(_) => Arc::new(AdcTokenProvider::new()),
        };

        // Prompt template
        let explicit_prompt = config
            .prompt_path
            .clone()
            .or_else(|| std::env::var("PROMPT_TEMPLATE_PATH").ok())
            .map(PathBuf::from);
        let location = PromptLocation::resolve(explicit_prompt.as_deref(), Path::new(&config.data_dir));
        debug!("Prompt template location: {:?}", location);
        let prompt_source: Arc<dyn PromptSource> = Arc::new(FilePromptSource::new(location));

        // Generative model
        let model: Arc<dyn GenerativeModel> = if config.mock_model {
            debug!("Using mock generative model");
            Arc::new(MockGenerativeModel::new())
        } else {
            let mut client = VertexAiClient::from_env(&gcp, token_provider.clone());
            if let Some(model) = config.model.as_deref() {
                client = client.with_model(model);
            }
            debug!("Using Vertex AI model {} in {}", client.model_name(), gcp.region());
            Arc::new(client)
        };

        // Conversation store
        if !config.seed_conversations.is_empty() && config.store != ConversationStore::Memory {
            warn!(
                "Ignoring --seed-conversation: only the memory store is seeded (store: {})",
                config.store.as_str()
            );
        }
        let conversations: Arc<dyn ConversationRepository> = match config.store {
            ConversationStore::Firestore => {
                let firestore_tokens: Arc<dyn AccessTokenProvider> =
                    if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
                        debug!("Using Firestore emulator");
                        Arc::new(StaticTokenProvider::new("owner"))
                    } else {
                        token_provider
                    };
                Arc::new(FirestoreConversationRepository::from_env(&gcp, firestore_tokens))
            }
            ConversationStore::Duckdb => {
                let db_path = PathBuf::from(&config.data_dir).join("conversations.duckdb");
                debug!("Using DuckDB conversation store at {:?}", db_path);
                Arc::new(DuckdbConversationRepository::new(&db_path)?)
            }
            ConversationStore::Memory => {
                debug!(
                    "Using in-memory conversation store seeded with {:?}",
                    config.seed_conversations
                );
                Arc::new(InMemoryConversationRepository::with_conversations(
                    config.seed_conversations.iter().cloned(),
                ))
            }
        };

        Ok(Self {
            prompt_source,
            model,
            conversations,
            gcp,
            config,
        })
    }

    /// Assemble a container from prebuilt handles.
    pub fn with_components(
        config: ContainerConfig,
        prompt_source: Arc<dyn PromptSource>,
        model: Arc<dyn GenerativeModel>,
        conversations: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            prompt_source,
            model,
            conversations,
            gcp: GcpSettings::from_env(),
            config,
        }
    }

    pub fn analyze_use_case(&self) -> AnalyzeMessageUseCase {
        AnalyzeMessageUseCase::new(
            self.prompt_source.clone(),
            self.model.clone(),
            self.conversations.clone(),
        )
    }

    pub fn conversations_use_case(&self) -> ManageConversationsUseCase {
        ManageConversationsUseCase::new(self.conversations.clone())
    }

    pub fn store(&self) -> ConversationStore {
        self.config.store
    }

    pub fn gcp_settings(&self) -> &GcpSettings {
        &self.gcp
    }
}
