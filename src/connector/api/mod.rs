pub mod container;
pub mod controller;
pub mod router;

pub use container::{Container, ContainerConfig, ConversationStore};
pub use router::Router;
