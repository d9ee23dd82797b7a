//! Capture controller
//!
//! Negotiates an encoding with the device, buffers the encoded fragments it
//! emits, and assembles them into an [`AudioClip`] on stop. Owns at most one
//! live capture; the device is always released on the stop path before
//! assembly, so release happens even when assembly fails.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::error::EncodingError;
use crate::domain::note::{AudioClip, AudioMimeType};

use super::ports::{CaptureDevice, CaptureError};

/// Buffering state of one live capture
struct ActiveCapture {
    encoding: AudioMimeType,
    fragments: Arc<StdMutex<Vec<Vec<u8>>>>,
    drain: Option<JoinHandle<()>>,
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        if let Some(handle) = self.drain.take() {
            handle.abort();
        }
    }
}

/// Controller for the audio capture lifecycle
#[derive(Default)]
pub struct CaptureController {
    active: Option<ActiveCapture>,
}

impl CaptureController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a capture is live
    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    /// The encoding negotiated for the live capture, if any
    pub fn encoding(&self) -> Option<AudioMimeType> {
        self.active.as_ref().map(|a| a.encoding)
    }

    /// Pick the first supported encoding from the preference list, falling
    /// back to the unconditional default when nothing matches.
    pub fn negotiate_encoding<D: CaptureDevice + ?Sized>(device: &D) -> AudioMimeType {
        AudioMimeType::PREFERENCE
            .iter()
            .copied()
            .find(|&encoding| device.supports(encoding))
            .unwrap_or_default()
    }

    /// Acquire the device and start buffering fragments.
    /// Returns the negotiated encoding.
    pub async fn start<D: CaptureDevice + ?Sized>(
        &mut self,
        device: &D,
        fragment_interval: Duration,
    ) -> Result<AudioMimeType, CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }

        let encoding = Self::negotiate_encoding(device);
        let mut rx = device.acquire(encoding, fragment_interval).await?;

        let fragments = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&fragments);
        let drain = tokio::spawn(async move {
            while let Some(fragment) = rx.recv().await {
                if fragment.is_empty() {
                    continue;
                }
                if let Ok(mut buffer) = sink.lock() {
                    buffer.push(fragment);
                }
            }
            debug!("capture fragment stream closed");
        });

        self.active = Some(ActiveCapture {
            encoding,
            fragments,
            drain: Some(drain),
        });

        Ok(encoding)
    }

    /// Stop the live capture and assemble the recording.
    ///
    /// Idempotent: returns `Ok(None)` when nothing is capturing. Otherwise
    /// releases the device first, waits for the terminal flush, and
    /// concatenates the buffered fragments.
    pub async fn stop<D: CaptureDevice + ?Sized>(
        &mut self,
        device: &D,
    ) -> Result<Option<AudioClip>, EncodingError> {
        let Some(mut active) = self.active.take() else {
            return Ok(None);
        };

        // Release before assembly so the device never stays held on error.
        device.release();

        if let Some(drain) = active.drain.take() {
            if let Err(e) = drain.await {
                warn!(error = %e, "capture drain task failed");
            }
        }

        let fragments = {
            let mut buffer = active
                .fragments
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *buffer)
        };

        let clip = AudioClip::assemble(&fragments, active.encoding)?;
        Ok(Some(clip))
    }

    /// Discard the live capture without assembling anything.
    /// Safe to call when idle.
    pub fn abort<D: CaptureDevice + ?Sized>(&mut self, device: &D) {
        if let Some(active) = self.active.take() {
            device.release();
            drop(active); // aborts the drain task
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;

    /// Scripted device: emits the configured fragments on acquire, closes
    /// the fragment channel on release.
    struct ScriptedDevice {
        supported: Vec<AudioMimeType>,
        fragments: Vec<Vec<u8>>,
        sender: StdMutex<Option<mpsc::Sender<Vec<u8>>>>,
        released: AtomicBool,
    }

    impl ScriptedDevice {
        fn new(supported: Vec<AudioMimeType>, fragments: Vec<Vec<u8>>) -> Self {
            Self {
                supported,
                fragments,
                sender: StdMutex::new(None),
                released: AtomicBool::new(false),
            }
        }

        fn released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaptureDevice for ScriptedDevice {
        fn supports(&self, encoding: AudioMimeType) -> bool {
            self.supported.contains(&encoding)
        }

        async fn acquire(
            &self,
            _encoding: AudioMimeType,
            _fragment_interval: Duration,
        ) -> Result<mpsc::Receiver<Vec<u8>>, CaptureError> {
            let (tx, rx) = mpsc::channel(32);
            for fragment in &self.fragments {
                tx.send(fragment.clone()).await.ok();
            }
            *self.sender.lock().unwrap() = Some(tx);
            self.released.store(false, Ordering::SeqCst);
            Ok(rx)
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
            // Dropping the sender closes the channel: terminal flush signal
            self.sender.lock().unwrap().take();
        }
    }

    #[test]
    fn negotiation_prefers_opus_in_webm() {
        let device = ScriptedDevice::new(
            vec![AudioMimeType::WebmOpus, AudioMimeType::Mp4],
            vec![],
        );
        assert_eq!(
            CaptureController::negotiate_encoding(&device),
            AudioMimeType::WebmOpus
        );
    }

    #[test]
    fn negotiation_walks_the_preference_list() {
        let device = ScriptedDevice::new(vec![AudioMimeType::Mp4], vec![]);
        assert_eq!(
            CaptureController::negotiate_encoding(&device),
            AudioMimeType::Mp4
        );
    }

    #[test]
    fn negotiation_falls_back_to_default() {
        let device = ScriptedDevice::new(vec![], vec![]);
        assert_eq!(
            CaptureController::negotiate_encoding(&device),
            AudioMimeType::default()
        );
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let device = ScriptedDevice::new(vec![AudioMimeType::WebmOpus], vec![vec![1]]);
        let mut controller = CaptureController::new();

        controller
            .start(&device, Duration::from_secs(1))
            .await
            .unwrap();
        let err = controller
            .start(&device, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::AlreadyCapturing));
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_noop() {
        let device = ScriptedDevice::new(vec![], vec![]);
        let mut controller = CaptureController::new();
        let clip = controller.stop(&device).await.unwrap();
        assert!(clip.is_none());
    }

    #[tokio::test]
    async fn stop_assembles_fragments_and_releases_device() {
        let device = ScriptedDevice::new(
            vec![AudioMimeType::WebmOpus],
            vec![vec![1, 2], vec![3], vec![4, 5]],
        );
        let mut controller = CaptureController::new();

        let encoding = controller
            .start(&device, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(encoding, AudioMimeType::WebmOpus);
        assert!(controller.is_capturing());

        let clip = controller.stop(&device).await.unwrap().unwrap();
        assert_eq!(clip.data(), &[1, 2, 3, 4, 5]);
        assert_eq!(clip.mime_type(), AudioMimeType::WebmOpus);
        assert!(device.released());
        assert!(!controller.is_capturing());
    }

    #[tokio::test]
    async fn stop_with_no_fragments_releases_device_before_failing() {
        let device = ScriptedDevice::new(vec![AudioMimeType::WebmOpus], vec![]);
        let mut controller = CaptureController::new();

        controller
            .start(&device, Duration::from_secs(1))
            .await
            .unwrap();
        let err = controller.stop(&device).await.unwrap_err();
        assert!(matches!(err, EncodingError::EmptyAudio));
        assert!(device.released());
    }

    #[tokio::test]
    async fn abort_discards_and_releases() {
        let device = ScriptedDevice::new(vec![AudioMimeType::WebmOpus], vec![vec![1]]);
        let mut controller = CaptureController::new();

        controller
            .start(&device, Duration::from_secs(1))
            .await
            .unwrap();
        controller.abort(&device);

        assert!(!controller.is_capturing());
        assert!(device.released());

        // A second abort is harmless
        controller.abort(&device);
    }
}
