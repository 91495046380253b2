mod analyze_message;
mod manage_conversations;

pub use analyze_message::*;
pub use manage_conversations::*;
