//! Recorder configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::note::MAX_RECORDING_SECS;

/// Default fragment cadence during capture (one encoded fragment per second)
pub const DEFAULT_FRAGMENT_INTERVAL_MS: u64 = 1000;

/// Recorder configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub backend_url: Option<String>,
    pub max_duration_secs: Option<u64>,
    pub fragment_interval_ms: Option<u64>,
    pub notify: Option<bool>,
}

impl RecorderConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            backend_url: None,
            max_duration_secs: Some(MAX_RECORDING_SECS),
            fragment_interval_ms: Some(DEFAULT_FRAGMENT_INTERVAL_MS),
            notify: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend_url: other.backend_url.or(self.backend_url),
            max_duration_secs: other.max_duration_secs.or(self.max_duration_secs),
            fragment_interval_ms: other.fragment_interval_ms.or(self.fragment_interval_ms),
            notify: other.notify.or(self.notify),
        }
    }

    /// Get the maximum recording duration, or the built-in limit if not set
    pub fn max_duration_secs_or_default(&self) -> u64 {
        self.max_duration_secs.unwrap_or(MAX_RECORDING_SECS)
    }

    /// Get the capture fragment cadence, or one second if not set
    pub fn fragment_interval_or_default(&self) -> Duration {
        Duration::from_millis(
            self.fragment_interval_ms
                .unwrap_or(DEFAULT_FRAGMENT_INTERVAL_MS),
        )
    }

    /// Get the notification setting, or true if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(true)
    }
}
