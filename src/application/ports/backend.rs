//! Note persistence backend port interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::note::RecordId;

/// Backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("failed to parse backend response: {0}")]
    InvalidResponse(String),
}

/// Request payload for the transcribe-and-save operation.
///
/// Two call shapes share this payload: transcription-only (no
/// `confirmed_text`/`save_mode`) and confirm-save (`save_mode = true`,
/// carrying the final edited text).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSaveRequest {
    pub record_id: String,
    pub audio_encoded_text: String,
    pub audio_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_mode: Option<bool>,
}

/// Structured response of the transcribe-and-save operation.
/// `success == false` is a soft failure carried in-band, not a transport
/// error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub success: bool,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Port for the remote transcription/persistence operations
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// Transcribe the audio and, in save mode, persist the confirmed note.
    ///
    /// Transport or service failure maps to
    /// [`BackendError::ServiceUnavailable`]; a structured failure comes back
    /// as `Ok` with `success == false`.
    async fn transcribe_and_save_note(
        &self,
        request: &NoteSaveRequest,
    ) -> Result<TranscribeResponse, BackendError>;

    /// Persist the audio alone against the host record.
    async fn save_audio_file(
        &self,
        record_id: &RecordId,
        audio_encoded_text: &str,
        audio_mime_type: &str,
    ) -> Result<(), BackendError>;
}
