mod callable;
mod health;
mod server;

pub use callable::*;
pub use health::*;
pub use server::*;
