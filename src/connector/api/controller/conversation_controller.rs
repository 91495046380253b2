use anyhow::Result;

use crate::ConversationRecord;

use super::super::Container;

pub struct ConversationController<'a> {
    container: &'a Container,
}

impl<'a> ConversationController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn create(&self, id: String) -> Result<String> {
        let record = self.container.conversations_use_case().create(&id).await?;
        Ok(format!(
            "Created conversation {} in the {} store.",
            record.id(),
            self.container.store().as_str()
        ))
    }

    pub async fn show(&self, id: String) -> Result<String> {
        let record = self.container.conversations_use_case().get(&id).await?;
        Ok(self.format_record(&record))
    }

    fn format_record(&self, record: &ConversationRecord) -> String {
        let timestamp = record
            .last_analysis_timestamp()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "(never)".to_string());
        let feedback = record.latest_analysis_feedback().unwrap_or("(none)");

        format!(
            "Conversation: {}\nLast analysis: {}\n\n{}",
            record.id(),
            timestamp,
            feedback
        )
    }
}
