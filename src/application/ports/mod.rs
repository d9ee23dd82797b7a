//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod backend;
pub mod capture;
pub mod config;
pub mod notifier;

// Re-export common types
pub use backend::{BackendError, NoteBackend, NoteSaveRequest, TranscribeResponse};
pub use capture::{CaptureDevice, CaptureError};
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationSeverity, Notifier};
