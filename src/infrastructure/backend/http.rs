//! HTTP note backend adapter
//!
//! Talks to the remote transcription/persistence service over JSON.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::application::ports::{BackendError, NoteBackend, NoteSaveRequest, TranscribeResponse};
use crate::domain::note::RecordId;

/// Path of the transcribe-and-save endpoint
const TRANSCRIBE_PATH: &str = "/voice-notes/transcribe";

/// Path of the audio-only save endpoint
const AUDIO_PATH: &str = "/voice-notes/audio";

/// Request body for the audio-only save endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioSaveRequest<'a> {
    record_id: &'a str,
    audio_encoded_text: &'a str,
    audio_mime_type: &'a str,
}

/// HTTP note backend
pub struct HttpNoteBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNoteBackend {
    /// Create a backend against the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Create with a preconfigured client (timeouts, proxies)
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut backend = Self::new(base_url);
        backend.client = client;
        backend
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-2xx status to a backend error. 5xx means the service itself
    /// is down; anything else is a rejected request.
    async fn status_error(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status.is_server_error() {
            BackendError::ServiceUnavailable(format!("HTTP {}: {}", status, body))
        } else {
            BackendError::RequestFailed(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl NoteBackend for HttpNoteBackend {
    async fn transcribe_and_save_note(
        &self,
        request: &NoteSaveRequest,
    ) -> Result<TranscribeResponse, BackendError> {
        let url = self.url(TRANSCRIBE_PATH);
        debug!(url = %url, save_mode = ?request.save_mode, "calling transcribe endpoint");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json::<TranscribeResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn save_audio_file(
        &self,
        record_id: &RecordId,
        audio_encoded_text: &str,
        audio_mime_type: &str,
    ) -> Result<(), BackendError> {
        let url = self.url(AUDIO_PATH);
        debug!(url = %url, record_id = %record_id, "calling audio save endpoint");

        let body = AudioSaveRequest {
            record_id: record_id.as_str(),
            audio_encoded_text,
            audio_mime_type,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        let backend = HttpNoteBackend::new("https://api.example.com/");
        assert_eq!(
            backend.url(TRANSCRIBE_PATH),
            "https://api.example.com/voice-notes/transcribe"
        );
        assert_eq!(
            backend.url(AUDIO_PATH),
            "https://api.example.com/voice-notes/audio"
        );
    }

    #[test]
    fn transcribe_request_serializes_camel_case() {
        let request = NoteSaveRequest {
            record_id: "rec-1".to_string(),
            audio_encoded_text: "AQID".to_string(),
            audio_mime_type: "audio/webm;codecs=opus".to_string(),
            confirmed_text: None,
            save_mode: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["recordId"], "rec-1");
        assert_eq!(json["audioEncodedText"], "AQID");
        assert_eq!(json["audioMimeType"], "audio/webm;codecs=opus");
        // Absent options are omitted, not serialized as null
        assert!(json.get("confirmedText").is_none());
        assert!(json.get("saveMode").is_none());
    }

    #[test]
    fn confirm_request_carries_save_fields() {
        let request = NoteSaveRequest {
            record_id: "rec-1".to_string(),
            audio_encoded_text: "AQID".to_string(),
            audio_mime_type: "audio/webm".to_string(),
            confirmed_text: Some("Buy milk".to_string()),
            save_mode: Some(true),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["confirmedText"], "Buy milk");
        assert_eq!(json["saveMode"], true);
    }

    #[test]
    fn response_parses_with_missing_optionals() {
        let response: TranscribeResponse =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.transcription.is_none());
        assert!(response.error_message.is_none());

        let response: TranscribeResponse = serde_json::from_str(
            r#"{"success": false, "errorMessage": "model offline"}"#,
        )
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.error_message.as_deref(), Some("model offline"));
    }
}
