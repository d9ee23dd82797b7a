//! Capture device port interface

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::note::AudioMimeType;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("no audio input device available")]
    NoDevice,

    #[error("audio device access denied: {0}")]
    AccessDenied(String),

    #[error("capture already in progress")]
    AlreadyCapturing,

    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

/// Port for the platform audio capture capability.
///
/// Acquisition is exclusive: at most one live capture per device. The device
/// emits encoded fragments on the requested cadence; after `release` it
/// flushes any final fragments and closes the channel. The channel closing is
/// the terminal flush signal consumers wait on.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Capability query: can the device produce this encoding?
    fn supports(&self, encoding: AudioMimeType) -> bool;

    /// Acquire the input device and start emitting encoded fragments.
    ///
    /// # Arguments
    /// * `encoding` - The negotiated encoding to capture in
    /// * `fragment_interval` - Cadence at which fragments are emitted
    ///
    /// # Returns
    /// A receiver of encoded fragments, or an error when the device is
    /// absent or access is denied
    async fn acquire(
        &self,
        encoding: AudioMimeType,
        fragment_interval: Duration,
    ) -> Result<mpsc::Receiver<Vec<u8>>, CaptureError>;

    /// Release the device unconditionally. Safe to call when not capturing.
    /// Must leave no device indicator active once it returns.
    fn release(&self);
}
