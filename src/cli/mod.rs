use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server exposing the analysis callable and the health check
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },

    /// Analyze one message and store the result on its conversation
    Analyze {
        conversation_id: String,

        message: String,
    },

    /// Create or inspect conversation documents
    Conversation {
        #[command(subcommand)]
        action: ConversationCommand,
    },

    /// Print the health check payload
    Health,
}

#[derive(Subcommand)]
pub enum ConversationCommand {
    Create { id: String },

    Show { id: String },
}
