/// Token replaced by the user's message when a template is filled.
pub const USER_MESSAGE_PLACEHOLDER: &str = "{{USER_MESSAGE}}";

/// Immutable prompt text loaded from a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_placeholder(&self) -> bool {
        self.text.contains(USER_MESSAGE_PLACEHOLDER)
    }

    /// Replace every occurrence of the placeholder with `message`.
    pub fn fill(&self, message: &str) -> String {
        self.text.replace(USER_MESSAGE_PLACEHOLDER, message)
    }
}
