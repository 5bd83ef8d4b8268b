pub mod backend;
pub mod config;
pub mod conversation;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use backend::RagClient;
pub use config::Config;
pub use conversation::Conversation;
pub use error::BackendError;
pub use state::{ChatMessage, ChatRole};
