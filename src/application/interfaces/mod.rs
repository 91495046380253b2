mod analysis_trigger;
mod conversation_repository;
mod generative_model;
mod prompt_source;

pub use analysis_trigger::*;
pub use conversation_repository::*;
pub use generative_model::*;
pub use prompt_source::*;
