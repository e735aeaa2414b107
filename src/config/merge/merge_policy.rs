//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("mode", "baked")?
        .set_default("generator.facilities", vec!["embedfs"])?
        .set_default("generator.walker.symlinks", "follow")?
        .set_default("logging.level", "info")
}
