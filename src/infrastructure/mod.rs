//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the application port traits.

pub mod backend;
pub mod config;
pub mod notification;

// Re-export adapters
pub use backend::HttpNoteBackend;
pub use config::XdgConfigStore;
pub use notification::NotifyRustNotifier;
