//! Config store port interface

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::RecorderConfig;
use crate::domain::error::ConfigError;

/// Port for loading and persisting recorder configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the config, returning an empty config if none exists
    async fn load(&self) -> Result<RecorderConfig, ConfigError>;

    /// Save the config, creating parent directories as needed
    async fn save(&self, config: &RecorderConfig) -> Result<(), ConfigError>;

    /// Path of the backing file
    fn path(&self) -> PathBuf;

    /// Check whether the backing file exists
    fn exists(&self) -> bool;

    /// Write a fresh config file with default values.
    /// Fails if one already exists.
    async fn init(&self) -> Result<(), ConfigError>;
}
