mod duckdb_conversation_repository;
mod file_prompt_source;
mod firestore_conversation_repository;
mod gcp;
pub mod http;
mod in_memory_conversation_repository;
mod mock_generative_model;
mod vertex_ai_client;

pub use duckdb_conversation_repository::*;
pub use file_prompt_source::*;
pub use firestore_conversation_repository::*;
pub use gcp::*;
pub use in_memory_conversation_repository::*;
pub use mock_generative_model::*;
pub use vertex_ai_client::*;
