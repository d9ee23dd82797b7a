//! Voice note session state machine

use std::fmt;
use thiserror::Error;

use super::audio_clip::AudioClip;
use super::duration::duration_label;

/// The step the session presents to the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingStep {
    #[default]
    Record,
    Preview,
    Success,
}

impl RecordingStep {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Preview => "preview",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for RecordingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The operation currently in flight, if any.
/// A single enum instead of independent boolean flags, so impossible
/// combinations (recording while transcribing, two saves at once) cannot
/// be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activity {
    #[default]
    Idle,
    Recording,
    Transcribing,
    Saving,
}

impl Activity {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Transcribing => "transcribing",
            Self::Saving => "saving",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid session transition: cannot {action} while {activity} in {step} step")]
pub struct InvalidStateTransition {
    pub step: RecordingStep,
    pub activity: Activity,
    pub action: &'static str,
}

/// Voice note session entity.
/// Owns the step/activity state machine and the data captured during one
/// record -> transcribe -> preview/save cycle.
///
/// State machine (step, driven through activity):
///   RECORD --transcription success--> PREVIEW --confirm save--> SUCCESS
///   RECORD --transcription failure--> RECORD (audio kept for audio-only save)
///   any step --reset--> RECORD
#[derive(Debug, Default)]
pub struct NoteSession {
    step: RecordingStep,
    activity: Activity,
    duration_secs: u64,
    audio: Option<AudioClip>,
    audio_base64: Option<String>,
    transcription_text: String,
    transcription_error: Option<String>,
}

impl NoteSession {
    /// Create a new session at the record step, idle
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current step
    pub fn step(&self) -> RecordingStep {
        self.step
    }

    /// Get the current activity
    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// Check if audio capture is in progress
    pub fn is_recording(&self) -> bool {
        self.activity == Activity::Recording
    }

    /// Check if a transcription call is in flight
    pub fn is_transcribing(&self) -> bool {
        self.activity == Activity::Transcribing
    }

    /// Check if a save call is in flight
    pub fn is_saving(&self) -> bool {
        self.activity == Activity::Saving
    }

    /// Elapsed recording duration in whole seconds
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Elapsed recording duration as a `mm:ss` label
    pub fn duration_label(&self) -> String {
        duration_label(self.duration_secs)
    }

    /// The assembled recording, if capture has completed
    pub fn audio(&self) -> Option<&AudioClip> {
        self.audio.as_ref()
    }

    /// The transfer-safe text encoding of the assembled recording
    pub fn audio_base64(&self) -> Option<&str> {
        self.audio_base64.as_deref()
    }

    /// Check whether an assembled recording is available
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// The current (possibly edited) transcript
    pub fn transcription_text(&self) -> &str {
        &self.transcription_text
    }

    /// The user-visible transcription error, if the last attempt failed
    pub fn transcription_error(&self) -> Option<&str> {
        self.transcription_error.as_deref()
    }

    fn invalid(&self, action: &'static str) -> InvalidStateTransition {
        InvalidStateTransition {
            step: self.step,
            activity: self.activity,
            action,
        }
    }

    /// Start a new recording attempt. Clears every artifact of the previous
    /// attempt (audio, transcript, error, duration) so the cycle starts from
    /// a clean slate.
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.step != RecordingStep::Record || self.activity != Activity::Idle {
            return Err(self.invalid("start recording"));
        }
        self.activity = Activity::Recording;
        self.duration_secs = 0;
        self.audio = None;
        self.audio_base64 = None;
        self.transcription_text.clear();
        self.transcription_error = None;
        Ok(())
    }

    /// Roll back a recording start whose device acquisition failed.
    /// The step is untouched, so the failure surfaces without a partial
    /// transition.
    pub fn recording_failed(&mut self) {
        if self.activity == Activity::Recording {
            self.activity = Activity::Idle;
        }
    }

    /// Advance the duration counter by one second while recording.
    /// Returns the new elapsed value.
    pub fn tick(&mut self) -> u64 {
        if self.activity == Activity::Recording {
            self.duration_secs += 1;
        }
        self.duration_secs
    }

    /// Stop capturing and enter the transcription window
    pub fn begin_transcribing(&mut self) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Recording {
            return Err(self.invalid("stop recording"));
        }
        self.activity = Activity::Transcribing;
        Ok(())
    }

    /// Attach the assembled recording and its text encoding.
    /// Replaces any previous recording wholesale.
    pub fn attach_audio(&mut self, clip: AudioClip, encoded: String) {
        self.audio = Some(clip);
        self.audio_base64 = Some(encoded);
    }

    /// Apply a successful transcription: populate the transcript and move
    /// to the preview step.
    pub fn apply_transcription(
        &mut self,
        text: impl Into<String>,
    ) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Transcribing {
            return Err(self.invalid("apply transcription"));
        }
        self.activity = Activity::Idle;
        self.step = RecordingStep::Preview;
        self.transcription_text = text.into();
        self.transcription_error = None;
        Ok(())
    }

    /// Apply a transcription soft failure: surface the message, stay at the
    /// record step, and keep the assembled audio so it can still be saved.
    pub fn apply_transcription_failure(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Transcribing {
            return Err(self.invalid("apply transcription failure"));
        }
        self.activity = Activity::Idle;
        self.transcription_error = Some(message.into());
        Ok(())
    }

    /// Replace the transcript verbatim while previewing. No validation.
    pub fn edit_transcript(
        &mut self,
        text: impl Into<String>,
    ) -> Result<(), InvalidStateTransition> {
        if self.step != RecordingStep::Preview || self.activity != Activity::Idle {
            return Err(self.invalid("edit transcript"));
        }
        self.transcription_text = text.into();
        Ok(())
    }

    /// Enter the saving window. Requires an assembled recording and no other
    /// operation in flight; this gates re-entrancy for both save paths.
    pub fn begin_saving(&mut self, action: &'static str) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Idle || self.audio.is_none() {
            return Err(self.invalid(action));
        }
        self.activity = Activity::Saving;
        Ok(())
    }

    /// Complete a confirm-save: the cycle is done, step becomes success
    pub fn complete_confirm_save(&mut self) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Saving {
            return Err(self.invalid("complete save"));
        }
        self.activity = Activity::Idle;
        self.step = RecordingStep::Success;
        Ok(())
    }

    /// A save call failed: leave step and data untouched so the user can retry
    pub fn save_failed(&mut self) -> Result<(), InvalidStateTransition> {
        if self.activity != Activity::Saving {
            return Err(self.invalid("fail save"));
        }
        self.activity = Activity::Idle;
        Ok(())
    }

    /// Clear everything and return to the initial record step.
    /// The only state-clearing operation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::note::AudioMimeType;

    fn clip() -> AudioClip {
        AudioClip::new(vec![1, 2, 3], AudioMimeType::WebmOpus).unwrap()
    }

    fn recorded_session() -> NoteSession {
        let mut session = NoteSession::new();
        session.begin_recording().unwrap();
        session.begin_transcribing().unwrap();
        let c = clip();
        let encoded = c.to_base64();
        session.attach_audio(c, encoded);
        session
    }

    #[test]
    fn new_session_is_idle_at_record_step() {
        let session = NoteSession::new();
        assert_eq!(session.step(), RecordingStep::Record);
        assert_eq!(session.activity(), Activity::Idle);
        assert!(!session.is_recording());
        assert!(!session.is_transcribing());
        assert!(!session.is_saving());
        assert!(!session.has_audio());
        assert_eq!(session.transcription_text(), "");
        assert!(session.transcription_error().is_none());
        assert_eq!(session.duration_label(), "00:00");
    }

    #[test]
    fn begin_recording_from_idle() {
        let mut session = NoteSession::new();
        assert!(session.begin_recording().is_ok());
        assert!(session.is_recording());
        assert!(!session.has_audio());
    }

    #[test]
    fn begin_recording_twice_fails() {
        let mut session = NoteSession::new();
        session.begin_recording().unwrap();

        let err = session.begin_recording().unwrap_err();
        assert_eq!(err.activity, Activity::Recording);
        assert_eq!(err.action, "start recording");
    }

    #[test]
    fn begin_recording_clears_previous_attempt() {
        let mut session = recorded_session();
        session
            .apply_transcription_failure("service down")
            .unwrap();
        assert!(session.has_audio());
        assert!(session.transcription_error().is_some());

        session.begin_recording().unwrap();
        assert!(!session.has_audio());
        assert!(session.audio_base64().is_none());
        assert!(session.transcription_error().is_none());
        assert_eq!(session.duration_secs(), 0);
    }

    #[test]
    fn recording_failed_rolls_back_without_step_change() {
        let mut session = NoteSession::new();
        session.begin_recording().unwrap();
        session.recording_failed();
        assert_eq!(session.step(), RecordingStep::Record);
        assert_eq!(session.activity(), Activity::Idle);
        // Can retry
        assert!(session.begin_recording().is_ok());
    }

    #[test]
    fn tick_only_counts_while_recording() {
        let mut session = NoteSession::new();
        assert_eq!(session.tick(), 0);

        session.begin_recording().unwrap();
        assert_eq!(session.tick(), 1);
        assert_eq!(session.tick(), 2);

        session.begin_transcribing().unwrap();
        assert_eq!(session.tick(), 2);
    }

    #[test]
    fn duration_label_after_ticks() {
        let mut session = NoteSession::new();
        session.begin_recording().unwrap();
        for _ in 0..65 {
            session.tick();
        }
        assert_eq!(session.duration_label(), "01:05");
    }

    #[test]
    fn begin_transcribing_requires_recording() {
        let mut session = NoteSession::new();
        let err = session.begin_transcribing().unwrap_err();
        assert_eq!(err.activity, Activity::Idle);
    }

    #[test]
    fn transcription_success_moves_to_preview() {
        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();

        assert_eq!(session.step(), RecordingStep::Preview);
        assert_eq!(session.activity(), Activity::Idle);
        assert_eq!(session.transcription_text(), "Buy milk");
        assert!(session.transcription_error().is_none());
        assert!(session.has_audio());
    }

    #[test]
    fn transcription_failure_stays_at_record_and_keeps_audio() {
        let mut session = recorded_session();
        session
            .apply_transcription_failure("model unavailable")
            .unwrap();

        assert_eq!(session.step(), RecordingStep::Record);
        assert_eq!(session.activity(), Activity::Idle);
        assert_eq!(session.transcription_error(), Some("model unavailable"));
        assert!(session.has_audio());
    }

    #[test]
    fn edit_transcript_only_in_preview() {
        let mut session = NoteSession::new();
        assert!(session.edit_transcript("nope").is_err());

        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();
        session.edit_transcript("Buy milk and eggs").unwrap();
        assert_eq!(session.transcription_text(), "Buy milk and eggs");
    }

    #[test]
    fn edit_transcript_is_verbatim() {
        let mut session = recorded_session();
        session.apply_transcription("x").unwrap();
        session.edit_transcript("  spaced  \n").unwrap();
        assert_eq!(session.transcription_text(), "  spaced  \n");
    }

    #[test]
    fn begin_saving_requires_audio() {
        let mut session = NoteSession::new();
        let err = session.begin_saving("save audio").unwrap_err();
        assert_eq!(err.action, "save audio");
    }

    #[test]
    fn begin_saving_gates_reentrancy() {
        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();
        session.begin_saving("confirm and save").unwrap();

        let err = session.begin_saving("confirm and save").unwrap_err();
        assert_eq!(err.activity, Activity::Saving);
    }

    #[test]
    fn confirm_save_completes_to_success() {
        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();
        session.begin_saving("confirm and save").unwrap();
        session.complete_confirm_save().unwrap();

        assert_eq!(session.step(), RecordingStep::Success);
        assert_eq!(session.activity(), Activity::Idle);
        assert!(!session.is_recording());
    }

    #[test]
    fn save_failed_keeps_preview_for_retry() {
        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();
        session.begin_saving("confirm and save").unwrap();
        session.save_failed().unwrap();

        assert_eq!(session.step(), RecordingStep::Preview);
        assert_eq!(session.activity(), Activity::Idle);
        assert_eq!(session.transcription_text(), "Buy milk");
        assert!(session.has_audio());
        // Retry is possible
        assert!(session.begin_saving("confirm and save").is_ok());
    }

    #[test]
    fn reset_clears_everything_from_any_step() {
        let mut session = recorded_session();
        session.apply_transcription("Buy milk").unwrap();
        session.reset();

        assert_eq!(session.step(), RecordingStep::Record);
        assert_eq!(session.activity(), Activity::Idle);
        assert!(!session.has_audio());
        assert!(session.audio_base64().is_none());
        assert_eq!(session.transcription_text(), "");
        assert!(session.transcription_error().is_none());
        assert_eq!(session.duration_secs(), 0);
    }

    #[test]
    fn full_cycle() {
        let mut session = NoteSession::new();

        session.begin_recording().unwrap();
        session.tick();
        session.begin_transcribing().unwrap();
        let c = clip();
        let encoded = c.to_base64();
        session.attach_audio(c, encoded);
        session.apply_transcription("Buy milk").unwrap();
        session.edit_transcript("Buy milk and eggs").unwrap();
        session.begin_saving("confirm and save").unwrap();
        session.complete_confirm_save().unwrap();
        assert_eq!(session.step(), RecordingStep::Success);

        // A new cycle starts from a clean slate after reset
        session.reset();
        assert!(session.begin_recording().is_ok());
    }

    #[test]
    fn step_display() {
        assert_eq!(RecordingStep::Record.to_string(), "record");
        assert_eq!(RecordingStep::Preview.to_string(), "preview");
        assert_eq!(RecordingStep::Success.to_string(), "success");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            step: RecordingStep::Record,
            activity: Activity::Transcribing,
            action: "start recording",
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("transcribing"));
        assert!(msg.contains("record"));
    }
}
