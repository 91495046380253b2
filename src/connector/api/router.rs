use anyhow::Result;

use crate::cli::{Commands, ConversationCommand};

use super::container::Container;
use super::controller::{
    AnalyzeController, ConversationController, HealthController, ServeController,
};

pub struct Router<'a> {
    analyze_controller: AnalyzeController<'a>,
    conversation_controller: ConversationController<'a>,
    health_controller: HealthController,
    serve_controller: ServeController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            analyze_controller: AnalyzeController::new(container),
            conversation_controller: ConversationController::new(container),
            health_controller: HealthController::new(),
            serve_controller: ServeController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve { port, public } => self.serve_controller.serve(port, public).await,
            Commands::Analyze {
                conversation_id,
                message,
            } => self.analyze_controller.analyze(conversation_id, message).await,
            Commands::Conversation { action } => match action {
                ConversationCommand::Create { id } => self.conversation_controller.create(id).await,
                ConversationCommand::Show { id } => self.conversation_controller.show(id).await,
            },
            Commands::Health => self.health_controller.health(),
        }
    }
}
