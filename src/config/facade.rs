//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::EmbedConfig;
use crate::error::Result;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `embedfs.toml` in `project_root` and the environment.
    pub fn load(project_root: &Path) -> Result<EmbedConfig> {
        let config = MergeService::load(project_root)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<EmbedConfig> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment alone, as a program does at start.
    pub fn load_from_env() -> Result<EmbedConfig> {
        let config = MergeService::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> EmbedConfig {
        EmbedConfig::default()
    }
}
