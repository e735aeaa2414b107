//! MergeService: orchestrates sources, applies merge policy, deserializes to EmbedConfig.

use crate::config::sources::{environment, project_file};
use crate::config::EmbedConfig;
use config::ConfigError;
use config::File;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config for a project.
    /// Precedence: defaults (lowest) -> embedfs.toml -> environment -> EMBEDFS_USE_FS (highest).
    pub fn load(project_root: &Path) -> Result<EmbedConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<EmbedConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Defaults and environment only
    pub fn load_from_env() -> Result<EmbedConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
