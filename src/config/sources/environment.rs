//! Environment variable source: EMBEDFS_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use tracing::debug;

pub const ENV_PREFIX: &str = "EMBEDFS";

/// Boolean shortcut: a truthy value selects live mode, a falsy one baked mode
pub const USE_FS_VAR: &str = "EMBEDFS_USE_FS";

/// Add environment variable overlay to builder.
/// `EMBEDFS_MODE=live`, `EMBEDFS_GENERATOR__MODULE_NAME=assets`, and so on.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    add_use_fs_override(builder)
}

/// Apply `EMBEDFS_USE_FS` on top of every other source
pub fn add_use_fs_override(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Ok(raw) = std::env::var(USE_FS_VAR) else {
        return Ok(builder);
    };
    let live = parse_flag(&raw).ok_or_else(|| {
        ConfigError::Message(format!("{} must be a boolean, got {:?}", USE_FS_VAR, raw))
    })?;
    let mode = if live { "live" } else { "baked" };
    debug!(mode, "Mode set from {}", USE_FS_VAR);
    builder.set_override("mode", mode)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
