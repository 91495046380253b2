//! # Connector Layer
//!
//! External integrations implementing the application interfaces:
//! - Prompt templates read from disk
//! - Gemini on Vertex AI, authenticated with Application Default Credentials
//! - Conversation documents in Firestore, DuckDB or memory
//! - The HTTP surface (callable analysis endpoint and health check)

pub mod adapter;
pub mod api;

pub use adapter::*;
