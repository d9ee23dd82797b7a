//! Application layer - Use cases and port interfaces
//!
//! Contains the session orchestration logic and trait definitions
//! for external system interactions.

pub mod capture;
pub mod ports;
pub mod voice_note;

// Re-export use cases
pub use capture::CaptureController;
pub use voice_note::{SessionSnapshot, VoiceNoteError, VoiceNoteUseCase};
