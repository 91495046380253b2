pub mod analyze_controller;
pub mod conversation_controller;
pub mod health_controller;
pub mod serve_controller;

pub use analyze_controller::AnalyzeController;
pub use conversation_controller::ConversationController;
pub use health_controller::HealthController;
pub use serve_controller::ServeController;
