//! Audio clip value object

use std::fmt;

use base64::Engine;

use crate::domain::error::EncodingError;

/// Supported capture encodings, identified by MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMimeType {
    WebmOpus,
    OggOpus,
    Webm,
    Mp4,
}

impl AudioMimeType {
    /// Ordered negotiation preference: opus-in-container first, then plain
    /// containers. When nothing in the list is supported the default applies.
    pub const PREFERENCE: [AudioMimeType; 4] = [
        Self::WebmOpus,
        Self::OggOpus,
        Self::Webm,
        Self::Mp4,
    ];

    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WebmOpus => "audio/webm;codecs=opus",
            Self::OggOpus => "audio/ogg;codecs=opus",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::WebmOpus | Self::Webm => "webm",
            Self::OggOpus => "ogg",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for AudioMimeType {
    fn default() -> Self {
        Self::Webm
    }
}

/// Value object representing an assembled recording.
/// Holds the concatenated encoded fragments and their negotiated encoding.
/// Always non-empty by construction.
#[derive(Debug, Clone)]
pub struct AudioClip {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl AudioClip {
    /// Create an AudioClip from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Result<Self, EncodingError> {
        if data.is_empty() {
            return Err(EncodingError::EmptyAudio);
        }
        Ok(Self { data, mime_type })
    }

    /// Assemble a clip by concatenating captured fragments in order
    pub fn assemble(fragments: &[Vec<u8>], mime_type: AudioMimeType) -> Result<Self, EncodingError> {
        let total: usize = fragments.iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for fragment in fragments {
            data.extend_from_slice(fragment);
        }
        Self::new(data, mime_type)
    }

    /// Decode a clip from its text-safe encoding
    pub fn from_base64(text: &str, mime_type: AudioMimeType) -> Result<Self, EncodingError> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(text)
            .map_err(|e| EncodingError::Malformed(e.to_string()))?;
        Self::new(data, mime_type)
    }

    /// Get the raw audio data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the encoding identifier
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Encode the audio data into its transfer-safe text form
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}
