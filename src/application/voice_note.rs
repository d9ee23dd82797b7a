//! Voice note session use case
//!
//! Orchestrates one record -> transcribe -> preview/save cycle against the
//! capture, backend, and notifier ports. All session effects are serialized
//! behind a single mutex, held across the one outstanding remote call, so no
//! two operations interleave their effects.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{debug, error, info, warn};

use crate::domain::config::RecorderConfig;
use crate::domain::error::EncodingError;
use crate::domain::note::{
    InvalidStateTransition, NoteSession, RecordId, RecordingStep, MAX_RECORDING_SECS,
};

use super::capture::CaptureController;
use super::ports::{
    BackendError, CaptureDevice, CaptureError, NoteBackend, NoteSaveRequest,
    NotificationSeverity, Notifier,
};

/// Message shown when transcription fails without a structured message
pub const DEFAULT_TRANSCRIPTION_ERROR: &str =
    "Transcription failed. The recording can still be saved as audio.";

/// Title used for all notifications raised by the session
const NOTIFY_TITLE: &str = "Voice Notes";

/// Errors from the voice note use case
#[derive(Debug, Error)]
pub enum VoiceNoteError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Audio encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Save failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("No recorded audio to save")]
    NoAudio,
}

/// Read-only view of the session for host UI binding
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub step: RecordingStep,
    pub is_recording: bool,
    pub is_transcribing: bool,
    pub is_saving: bool,
    pub duration_secs: u64,
    pub duration_label: String,
    pub transcription_text: String,
    pub transcription_error: Option<String>,
    pub has_audio: bool,
}

impl SessionSnapshot {
    fn of(session: &NoteSession) -> Self {
        Self {
            step: session.step(),
            is_recording: session.is_recording(),
            is_transcribing: session.is_transcribing(),
            is_saving: session.is_saving(),
            duration_secs: session.duration_secs(),
            duration_label: session.duration_label(),
            transcription_text: session.transcription_text().to_string(),
            transcription_error: session.transcription_error().map(str::to_string),
            has_audio: session.has_audio(),
        }
    }
}

struct Inner<D, B, N>
where
    D: CaptureDevice,
    B: NoteBackend,
    N: Notifier,
{
    device: D,
    backend: B,
    notifier: N,
    record_id: RecordId,
    max_duration_secs: u64,
    fragment_interval: StdDuration,
    notify_enabled: bool,
    // Lock order: session before capture, always.
    session: Mutex<NoteSession>,
    capture: Mutex<CaptureController>,
    timer: StdMutex<Option<JoinHandle<()>>>,
}

impl<D, B, N> Drop for Inner<D, B, N>
where
    D: CaptureDevice,
    B: NoteBackend,
    N: Notifier,
{
    fn drop(&mut self) {
        if let Ok(mut slot) = self.timer.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        let capture = self.capture.get_mut();
        if capture.is_capturing() {
            capture.abort(&self.device);
        }
    }
}

/// Voice note recording use case.
///
/// Cheaply cloneable handle; clones share the same session. At most one
/// recording session is active per instance.
pub struct VoiceNoteUseCase<D, B, N>
where
    D: CaptureDevice,
    B: NoteBackend,
    N: Notifier,
{
    inner: Arc<Inner<D, B, N>>,
}

impl<D, B, N> Clone for VoiceNoteUseCase<D, B, N>
where
    D: CaptureDevice,
    B: NoteBackend,
    N: Notifier,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, B, N> VoiceNoteUseCase<D, B, N>
where
    D: CaptureDevice + 'static,
    B: NoteBackend + 'static,
    N: Notifier + 'static,
{
    /// Create a use case with default settings
    pub fn new(device: D, backend: B, notifier: N, record_id: RecordId) -> Self {
        Self::with_config(device, backend, notifier, record_id, &RecorderConfig::defaults())
    }

    /// Create a use case with the given configuration
    pub fn with_config(
        device: D,
        backend: B,
        notifier: N,
        record_id: RecordId,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                device,
                backend,
                notifier,
                record_id,
                max_duration_secs: config.max_duration_secs_or_default().min(MAX_RECORDING_SECS),
                fragment_interval: config.fragment_interval_or_default(),
                notify_enabled: config.notify_or_default(),
                session: Mutex::new(NoteSession::new()),
                capture: Mutex::new(CaptureController::new()),
                timer: StdMutex::new(None),
            }),
        }
    }

    /// Get the current step
    pub async fn step(&self) -> RecordingStep {
        self.inner.session.lock().await.step()
    }

    /// Check if currently recording
    pub async fn is_recording(&self) -> bool {
        self.inner.session.lock().await.is_recording()
    }

    /// Get a read-only view of the session
    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&*self.inner.session.lock().await)
    }

    /// Start a new recording: acquire the device, begin buffering fragments,
    /// and start the duration timer. A denied or absent device surfaces as an
    /// error without changing the step.
    pub async fn start_recording(&self) -> Result<(), VoiceNoteError> {
        let mut session = self.inner.session.lock().await;
        session.begin_recording()?;

        let mut capture = self.inner.capture.lock().await;
        match capture
            .start(&self.inner.device, self.inner.fragment_interval)
            .await
        {
            Ok(encoding) => {
                drop(capture);
                info!(encoding = %encoding, "recording started");
                self.spawn_duration_timer();
                Ok(())
            }
            Err(e) => {
                session.recording_failed();
                error!(error = %e, "failed to acquire audio input device");
                self.notify(
                    "Microphone unavailable",
                    &e.to_string(),
                    NotificationSeverity::Error,
                )
                .await;
                Err(e.into())
            }
        }
    }

    /// Stop the recording (manual or auto-timeout path), assemble and encode
    /// the audio, and run the transcription call. Transcription failure is
    /// soft: the error is surfaced inline, the step stays at record, and the
    /// assembled audio remains available for the audio-only save.
    pub async fn stop_and_transcribe(&self) -> Result<(), VoiceNoteError> {
        let mut session = self.inner.session.lock().await;
        session.begin_transcribing()?;
        // Manual stop cancels the pending auto-stop as well.
        self.clear_timer();

        let mut capture = self.inner.capture.lock().await;
        let clip = match capture.stop(&self.inner.device).await {
            Ok(Some(clip)) => clip,
            Ok(None) => {
                warn!("stop requested but no capture was live");
                session.reset();
                return Err(VoiceNoteError::NoAudio);
            }
            Err(e) => {
                // Malformed capture is fatal for this recording. The device
                // was already released inside the stop path.
                error!(error = %e, "failed to assemble recording");
                session.reset();
                self.notify(
                    "Recording failed",
                    &e.to_string(),
                    NotificationSeverity::Error,
                )
                .await;
                return Err(e.into());
            }
        };
        drop(capture);

        let encoded = clip.to_base64();
        let mime_type = clip.mime_type();
        info!(
            size = %clip.human_readable_size(),
            encoding = %mime_type,
            duration = %session.duration_label(),
            "recording stopped, transcribing"
        );
        session.attach_audio(clip, encoded.clone());

        let request = NoteSaveRequest {
            record_id: self.inner.record_id.to_string(),
            audio_encoded_text: encoded,
            audio_mime_type: mime_type.as_str().to_string(),
            confirmed_text: None,
            save_mode: None,
        };

        match self.inner.backend.transcribe_and_save_note(&request).await {
            Ok(response) if response.success => {
                let text = response.transcription.unwrap_or_default();
                session.apply_transcription(text)?;
                info!("transcription ready, entering preview");
            }
            Ok(response) => {
                let message = response
                    .error_message
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_ERROR.to_string());
                warn!(message = %message, "transcription reported failure");
                session.apply_transcription_failure(message)?;
            }
            Err(e) => {
                warn!(error = %e, "transcription service unavailable");
                session.apply_transcription_failure(DEFAULT_TRANSCRIPTION_ERROR)?;
            }
        }
        Ok(())
    }

    /// Replace the transcript verbatim while previewing
    pub async fn edit_transcript(&self, text: impl Into<String>) -> Result<(), VoiceNoteError> {
        let mut session = self.inner.session.lock().await;
        session.edit_transcript(text)?;
        Ok(())
    }

    /// Persist the confirmed transcript together with the audio.
    /// A transcript that is blank after trimming is rejected locally, without
    /// a remote call. On failure the session stays in preview for retry.
    pub async fn confirm_save(&self) -> Result<(), VoiceNoteError> {
        let mut session = self.inner.session.lock().await;
        if session.step() != RecordingStep::Preview {
            return Err(VoiceNoteError::InvalidState(InvalidStateTransition {
                step: session.step(),
                activity: session.activity(),
                action: "confirm and save",
            }));
        }

        let confirmed = session.transcription_text().trim().to_string();
        if confirmed.is_empty() {
            self.notify(
                "Nothing to save",
                "The transcript is empty. Add some text before saving.",
                NotificationSeverity::Warning,
            )
            .await;
            return Err(VoiceNoteError::EmptyTranscript);
        }

        let encoded = session
            .audio_base64()
            .map(str::to_string)
            .ok_or(VoiceNoteError::NoAudio)?;
        let mime_type = session
            .audio()
            .map(|clip| clip.mime_type())
            .ok_or(VoiceNoteError::NoAudio)?;
        session.begin_saving("confirm and save")?;

        let request = NoteSaveRequest {
            record_id: self.inner.record_id.to_string(),
            audio_encoded_text: encoded,
            audio_mime_type: mime_type.as_str().to_string(),
            confirmed_text: Some(confirmed),
            save_mode: Some(true),
        };

        match self.inner.backend.transcribe_and_save_note(&request).await {
            Ok(response) if response.success => {
                session.complete_confirm_save()?;
                info!("voice note saved");
                Ok(())
            }
            Ok(response) => {
                session.save_failed()?;
                let message = response
                    .error_message
                    .unwrap_or_else(|| "The note could not be saved.".to_string());
                warn!(message = %message, "save reported failure");
                self.notify("Save failed", &message, NotificationSeverity::Error)
                    .await;
                Err(BackendError::RequestFailed(message).into())
            }
            Err(e) => {
                session.save_failed()?;
                warn!(error = %e, "save call failed");
                self.notify("Save failed", &e.to_string(), NotificationSeverity::Error)
                    .await;
                Err(e.into())
            }
        }
    }

    /// Persist the audio alone, without a transcript. Available from any
    /// step once a recording is assembled; on success the whole session
    /// resets for the next note.
    pub async fn save_audio_only(&self) -> Result<(), VoiceNoteError> {
        let mut session = self.inner.session.lock().await;
        let encoded = session
            .audio_base64()
            .map(str::to_string)
            .ok_or(VoiceNoteError::NoAudio)?;
        let mime_type = session
            .audio()
            .map(|clip| clip.mime_type())
            .ok_or(VoiceNoteError::NoAudio)?;
        session.begin_saving("save audio")?;

        match self
            .inner
            .backend
            .save_audio_file(&self.inner.record_id, &encoded, mime_type.as_str())
            .await
        {
            Ok(()) => {
                session.reset();
                info!("audio file saved without transcript");
                self.notify(
                    NOTIFY_TITLE,
                    "Audio saved to the record.",
                    NotificationSeverity::Success,
                )
                .await;
                Ok(())
            }
            Err(e) => {
                session.save_failed()?;
                warn!(error = %e, "audio-only save failed");
                self.notify("Save failed", &e.to_string(), NotificationSeverity::Error)
                    .await;
                Err(e.into())
            }
        }
    }

    /// Discard everything in memory and return to the record step.
    /// Releases the device and both timers before clearing data.
    pub async fn cancel(&self) {
        self.reset().await;
    }

    /// Full reset: the single release path for every live handle.
    /// Also the teardown hook for host detach.
    pub async fn reset(&self) {
        let mut session = self.inner.session.lock().await;
        self.clear_timer();
        let mut capture = self.inner.capture.lock().await;
        capture.abort(&self.inner.device);
        session.reset();
        debug!("session reset");
    }

    /// Spawn the once-per-second duration tick. On reaching the maximum
    /// duration the auto-stop runs on its own task, so the stop path can
    /// abort the tick task without cancelling itself.
    fn spawn_duration_timer(&self) {
        let this = self.clone();
        let max_secs = self.inner.max_duration_secs;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(TokioDuration::from_secs(1));
            // The first tick completes immediately; the count starts at zero.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let elapsed = {
                    let mut session = this.inner.session.lock().await;
                    if !session.is_recording() {
                        break;
                    }
                    session.tick()
                };
                if elapsed >= max_secs {
                    info!(max_secs, "maximum duration reached, auto-stopping");
                    let auto = this.clone();
                    tokio::spawn(async move {
                        match auto.stop_and_transcribe().await {
                            Ok(()) => {}
                            // The user stopped in the same instant; nothing to do.
                            Err(VoiceNoteError::InvalidState(_)) => {}
                            Err(e) => warn!(error = %e, "auto-stop failed"),
                        }
                    });
                    break;
                }
            }
        });

        let mut slot = self.inner.timer.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the duration tick and the pending auto-stop. Idempotent.
    fn clear_timer(&self) {
        let mut slot = self.inner.timer.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    async fn notify(&self, title: &str, message: &str, severity: NotificationSeverity) {
        if !self.inner.notify_enabled {
            return;
        }
        if let Err(e) = self.inner.notifier.notify(title, message, severity).await {
            warn!(error = %e, "failed to show notification");
        }
    }
}
