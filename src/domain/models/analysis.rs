use serde::{Deserialize, Serialize};

/// Literal prefix marking text as the expected analysis payload.
pub const ANALYSIS_MARKER: &str = "[ANALYSIS]:";

/// Analysis text produced by the model, normalized to start with
/// [`ANALYSIS_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Analysis(String);

impl Analysis {
    /// Normalize raw model output. Text already carrying the marker is kept
    /// verbatim, anything else gets `"[ANALYSIS]:\n"` prepended.
    pub fn from_model_output(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.starts_with(ANALYSIS_MARKER) {
            Self(text)
        } else {
            Self(format!("{ANALYSIS_MARKER}\n{text}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl AsRef<str> for Analysis {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
