use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Document collection holding one document per conversation.
pub const CONVERSATIONS_COLLECTION: &str = "conversations";
/// Field holding the most recent analysis text.
pub const LATEST_ANALYSIS_FIELD: &str = "latestAnalysisFeedback";
/// Field holding the store-assigned time of the last analysis write.
pub const LAST_ANALYSIS_TIMESTAMP_FIELD: &str = "lastAnalysisTimestamp";

/// Longest conversation id accepted, in bytes.
pub const MAX_CONVERSATION_ID_BYTES: usize = 1500;

/// Check that `id` can name a single conversation document in any store.
///
/// Rejects ids that are empty or whitespace-only, contain `/`, are `.` or
/// `..`, look like reserved `__name__` ids, or exceed
/// [`MAX_CONVERSATION_ID_BYTES`].
pub fn validate_conversation_id(id: &str) -> Result<(), DomainError> {
    let reason = if id.trim().is_empty() {
        "must not be empty"
    } else if id.contains('/') {
        "must not contain '/'"
    } else if id == "." || id == ".." {
        "must not be '.' or '..'"
    } else if id.len() >= 4 && id.starts_with("__") && id.ends_with("__") {
        "must not be of the form __name__"
    } else if id.len() > MAX_CONVERSATION_ID_BYTES {
        "is too long"
    } else {
        return Ok(());
    };

    Err(DomainError::invalid_argument(format!(
        "\"conversationId\" {reason}."
    )))
}

/// The analysis-related view of a conversation document.
///
/// Only the two analysis fields are owned by this service; whatever else the
/// client stores in the document is left untouched by updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    id: String,
    latest_analysis_feedback: Option<String>,
    /// Assigned by the store, never by the caller.
    last_analysis_timestamp: Option<DateTime<Utc>>,
}

impl ConversationRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            latest_analysis_feedback: None,
            last_analysis_timestamp: None,
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: String,
        latest_analysis_feedback: Option<String>,
        last_analysis_timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            latest_analysis_feedback,
            last_analysis_timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latest_analysis_feedback(&self) -> Option<&str> {
        self.latest_analysis_feedback.as_deref()
    }

    pub fn last_analysis_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_analysis_timestamp
    }

    pub fn has_analysis(&self) -> bool {
        self.latest_analysis_feedback.is_some()
    }

    /// Overwrite the analysis fields. `timestamp` must come from the store.
    pub fn record_analysis(&mut self, feedback: impl Into<String>, timestamp: DateTime<Utc>) {
        self.latest_analysis_feedback = Some(feedback.into());
        self.last_analysis_timestamp = Some(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_analysis() {
        let record = ConversationRecord::new("abc123");
        assert_eq!(record.id(), "abc123");
        assert!(!record.has_analysis());
        assert_eq!(record.last_analysis_timestamp(), None);
    }

    #[test]
    fn accepts_plain_document_ids() {
        for id in ["abc123", "a.b", "user_42-chat", "__x", "x__", "a?b#c%d"] {
            assert!(validate_conversation_id(id).is_ok(), "{id} should be accepted");
        }
    }

    #[test]
    fn rejects_ids_that_do_not_name_one_document() {
        let too_long = "x".repeat(MAX_CONVERSATION_ID_BYTES + 1);
        for id in ["", "  ", "abc/123", ".", "..", "__x__", too_long.as_str()] {
            let err = validate_conversation_id(id).unwrap_err();
            assert!(err.is_invalid_argument(), "{id} should be rejected");
            assert!(err.to_string().contains("conversationId"));
        }
    }

    #[test]
    fn record_analysis_overwrites_previous_feedback() {
        let first = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let second = DateTime::<Utc>::from_timestamp(1_700_000_060, 0).unwrap();

        let mut record = ConversationRecord::new("abc123");
        record.record_analysis("[ANALYSIS]:\nfirst", first);
        record.record_analysis("[ANALYSIS]:\nsecond", second);
        assert_eq!(record.latest_analysis_feedback(), Some("[ANALYSIS]:\nsecond"));
        assert_eq!(record.last_analysis_timestamp(), Some(second));
    }
}
