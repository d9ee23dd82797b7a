//! Voice note domain module

mod audio_clip;
mod duration;
mod record_id;
mod session;

pub use audio_clip::{AudioClip, AudioMimeType};
pub use duration::{duration_label, MAX_RECORDING_SECS};
pub use record_id::RecordId;
pub use session::{Activity, InvalidStateTransition, NoteSession, RecordingStep};
