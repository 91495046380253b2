use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::application::PromptSource;
use crate::domain::{DomainError, PromptTemplate};

/// Template path, relative to the working directory or the data directory.
pub const DEFAULT_PROMPT_FILE: &str = "prompts/negotiation_analysis.txt";

/// Where the prompt template lives: a primary path and an optional fallback.
///
/// Resolved once from configuration. [`FilePromptSource`] only ever reads the
/// paths it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLocation {
    primary: PathBuf,
    fallback: Option<PathBuf>,
}

impl PromptLocation {
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<PathBuf>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Resolution order:
    ///
    /// 1. `explicit`, when given (from `--prompt-path` or `PROMPT_TEMPLATE_PATH`)
    /// 2. otherwise [`DEFAULT_PROMPT_FILE`] relative to the working directory
    ///
    /// The fallback is always [`DEFAULT_PROMPT_FILE`] under `data_dir`.
    pub fn resolve(explicit: Option<&Path>, data_dir: &Path) -> Self {
        let primary = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_FILE));
        let fallback = data_dir.join(DEFAULT_PROMPT_FILE);

        if fallback == primary {
            Self::new(primary)
        } else {
            Self::new(primary).with_fallback(fallback)
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&Path> {
        self.fallback.as_deref()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.fallback.as_deref())
    }
}

/// Reads the prompt template from disk on every call.
pub struct FilePromptSource {
    location: PromptLocation,
}

impl FilePromptSource {
    pub fn new(location: PromptLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl PromptSource for FilePromptSource {
    async fn load(&self) -> Result<PromptTemplate, DomainError> {
        for path in self.location.candidates() {
            match tokio::fs::read_to_string(path).await {
                Ok(text) => {
                    debug!("Loaded prompt template from {}", path.display());
                    return Ok(PromptTemplate::new(text));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("No prompt template at {}", path.display());
                }
                Err(e) => {
                    return Err(DomainError::prompt_unavailable(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(DomainError::prompt_unavailable(format!(
            "No prompt template found (looked in {})",
            self.describe()
        )))
    }

    fn describe(&self) -> String {
        self.location
            .candidates()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
