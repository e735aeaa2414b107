//! CLI route: run context and command dispatch.

use crate::cli::output::{format_index_json, format_index_text};
use crate::cli::parse::Commands;
use crate::codec;
use crate::config::{ConfigLoader, EmbedConfig, GeneratorConfig};
use crate::generate::Generator;
use crate::scan::{CargoUnits, UnitResolver};
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: project root and loaded configuration.
pub struct RunContext {
    project_root: PathBuf,
    config: EmbedConfig,
}

impl RunContext {
    /// Load configuration from `config_path` if given, else from the project root.
    pub fn new(project_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => ConfigLoader::load(&project_root)
                .with_context(|| format!("load config for {}", project_root.display()))?,
        };
        Ok(Self {
            project_root,
            config,
        })
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Run one command, returning what should be printed on success.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Generate {
                out,
                module,
                manifest_dir,
                facilities,
                symlinks,
                sources,
            } => {
                let mut generator_config = self.config.generator.clone();
                if let Some(module) = module {
                    generator_config.module_name = Some(module.clone());
                }
                if !facilities.is_empty() {
                    generator_config.facilities = facilities.clone();
                }
                if let Some(symlinks) = symlinks {
                    generator_config.walker.symlinks = (*symlinks).into();
                }
                generator_config.validate().map_err(|e| anyhow!(e))?;

                let units = match manifest_dir {
                    Some(dir) => CargoUnits::for_manifest_dir(dir)
                        .with_context(|| format!("read package layout in {}", dir.display()))?,
                    None => CargoUnits::discover(),
                };
                self.generate(generator_config, &units, sources, out)
            }
            Commands::Inspect { file, format } => {
                let index = codec::read_from_path(file)
                    .with_context(|| format!("read tree index {}", file.display()))?;
                match format.as_str() {
                    "json" => format_index_json(&index).context("render index as json"),
                    "text" => Ok(format_index_text(&index)),
                    other => bail!("unknown format {:?} (expected text or json)", other),
                }
            }
        }
    }

    fn generate(
        &self,
        config: GeneratorConfig,
        units: &dyn UnitResolver,
        sources: &[PathBuf],
        out: &Path,
    ) -> Result<String> {
        let start = Instant::now();
        let generator = Generator::new(config, units);
        let artifacts = generator
            .run(sources, out)
            .context("generation aborted, nothing written")?;

        info!(
            out = %out.display(),
            entries = artifacts.entries,
            duration_ms = start.elapsed().as_millis(),
            "Generate command completed"
        );
        Ok(format!(
            "Embedded {} entries into {} (module `{}`, {} bytes)",
            artifacts.entries,
            out.display(),
            artifacts.module_name,
            artifacts.data.len()
        ))
    }
}
