//! Configuration System
//!
//! Layered configuration: built-in defaults, then `embedfs.toml` in the
//! project root, then `EMBEDFS_*` environment variables, then the
//! `EMBEDFS_USE_FS` shortcut. Selects the runtime [`Mode`] and tunes the
//! generator and logging.

use crate::error::{EmbedError, Result};
use crate::logging::LoggingConfig;
use crate::runtime::mode::Mode;
use crate::scan::DEFAULT_FACILITIES;
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::environment::{ENV_PREFIX, USE_FS_VAR};
pub use sources::project_file::PROJECT_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Where embedding requests are resolved at run time
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Crate names the embedding macros are imported from
    #[serde(default = "default_facilities")]
    pub facilities: Vec<String>,

    /// Symlink handling while packing
    #[serde(default)]
    pub walker: WalkerConfig,

    /// Name of the generated module (defaults to the output directory's name)
    #[serde(default)]
    pub module_name: Option<String>,
}

fn default_facilities() -> Vec<String> {
    DEFAULT_FACILITIES.iter().map(|s| s.to_string()).collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            facilities: default_facilities(),
            walker: WalkerConfig::default(),
            module_name: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.facilities.is_empty() {
            return Err("At least one facility crate name is required".to_string());
        }
        for name in &self.facilities {
            if !is_identifier(name) {
                return Err(format!("Facility '{}' is not a crate name", name));
            }
        }
        if let Some(module) = &self.module_name {
            if !is_identifier(module) {
                return Err(format!("Module name '{}' is not a Rust identifier", module));
            }
        }
        Ok(())
    }
}

/// True for a plain (non-raw) Rust identifier
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl EmbedConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Err(e) = self.generator.validate() {
            errors.push(format!("Generator: {}", e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("Logging: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EmbedError::Config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
