//! Domain layer - Core business logic
//!
//! Contains value objects, the session entity, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod note;

// Re-export common types
pub use config::RecorderConfig;
pub use error::*;
pub use note::{
    duration_label, Activity, AudioClip, AudioMimeType, InvalidStateTransition, NoteSession,
    RecordId, RecordingStep, MAX_RECORDING_SECS,
};
