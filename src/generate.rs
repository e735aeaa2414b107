//! Generator: scan sources, pack what they embed, render the artifacts
//!
//! Generation is all-or-nothing. The index is built in memory and nothing
//! is written until every source has been scanned.

use crate::codec;
use crate::config::{is_identifier, GeneratorConfig};
use crate::error::{EmbedError, Result};
use crate::scan::{Scanner, UnitResolver};
use crate::tree::builder::Packer;
use crate::tree::index::TreeIndex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

/// File name of the generated Rust module inside the output directory
pub const MODULE_FILE: &str = "mod.rs";
/// File name of the encoded tree index inside the output directory
pub const DATA_FILE: &str = "embedded.bin";

pub struct Generator<'a> {
    config: GeneratorConfig,
    units: &'a dyn UnitResolver,
}

impl<'a> Generator<'a> {
    pub fn new(config: GeneratorConfig, units: &'a dyn UnitResolver) -> Self {
        Self { config, units }
    }

    /// Scan every source and return the accumulated index.
    ///
    /// Directories among `sources` are searched for `.rs` files. The first
    /// error aborts the run.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn generate<P: AsRef<Path>>(&self, sources: &[P]) -> Result<TreeIndex> {
        let start = Instant::now();
        let packer = Packer::new().with_walker_config(self.config.walker.clone());
        let scanner = Scanner::new(self.units)
            .with_facilities(self.config.facilities.clone())
            .with_packer(packer);

        let files = collect_sources(sources)?;
        let mut index = TreeIndex::new();
        let mut calls = 0;
        for file in &files {
            calls += scanner.scan_file(file, &mut index)?;
        }

        info!(
            files = files.len(),
            calls,
            entries = index.len(),
            duration_ms = start.elapsed().as_millis(),
            "Generated tree index"
        );
        Ok(index)
    }

    /// Generate, render and write both artifacts into `out_dir`
    pub fn run<P: AsRef<Path>>(&self, sources: &[P], out_dir: &Path) -> Result<Artifacts> {
        let module_name = match &self.config.module_name {
            Some(name) => name.clone(),
            None => default_module_name(out_dir)?,
        };
        let facility = self
            .config
            .facilities
            .first()
            .cloned()
            .ok_or_else(|| EmbedError::Config("no facility crate configured".to_string()))?;

        let index = self.generate(sources)?;
        let artifacts = Artifacts::render(&index, &module_name, &facility)?;
        artifacts.write(out_dir)?;
        Ok(artifacts)
    }
}

/// Expand directories into the `.rs` files below them, in a stable order
pub fn collect_sources<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for source in sources {
        let source = source.as_ref();
        if !source.is_dir() {
            files.push(source.to_path_buf());
            continue;
        }
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => EmbedError::Io(io),
                None => EmbedError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("cannot search {}", source.display()),
                )),
            })?;
            if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "rs") {
                files.push(entry.into_path());
            }
        }
    }
    debug!(count = files.len(), "Collected source files");
    Ok(files)
}

/// Module name implied by the output directory's base name
pub fn default_module_name(out_dir: &Path) -> Result<String> {
    let name = out_dir
        .file_name()
        .map(|n| n.to_string_lossy().replace('-', "_"))
        .unwrap_or_default();
    if is_identifier(&name) {
        Ok(name)
    } else {
        Err(EmbedError::Config(format!(
            "cannot derive a module name from {}; pass one explicitly",
            out_dir.display()
        )))
    }
}

/// The two generated artifacts, held in memory until written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub module_name: String,
    /// Rust source of the functionality module
    pub module_source: String,
    /// Encoded tree index
    pub data: Vec<u8>,
    /// Number of index entries encoded in `data`
    pub entries: usize,
}

impl Artifacts {
    /// Encode `index` and render the module that loads it.
    ///
    /// `facility` is the crate path the generated code names, usually `embedfs`.
    pub fn render(index: &TreeIndex, module_name: &str, facility: &str) -> Result<Self> {
        if !is_identifier(module_name) {
            return Err(EmbedError::Config(format!(
                "module name '{}' is not a Rust identifier",
                module_name
            )));
        }
        let data = codec::encode(index)?;
        let module_source = MODULE_TEMPLATE
            .replace("{module}", module_name)
            .replace("{facility}", facility)
            .replace("{data_file}", DATA_FILE)
            .replace("{entries}", &index.len().to_string());

        Ok(Self {
            module_name: module_name.to_string(),
            module_source,
            data,
            entries: index.len(),
        })
    }

    /// Write `mod.rs` and `embedded.bin` into `out_dir`, replacing older copies
    #[instrument(skip(self, out_dir), fields(out_dir = %out_dir.display()))]
    pub fn write(&self, out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir)?;
        write_atomic(&out_dir.join(DATA_FILE), &self.data)?;
        write_atomic(&out_dir.join(MODULE_FILE), self.module_source.as_bytes())?;
        info!(
            module = %self.module_name,
            data_bytes = self.data.len(),
            "Wrote generated artifacts"
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        EmbedError::Io(e)
    })
}

const MODULE_TEMPLATE: &str = r#"// @generated by embedgen. Do not edit.

//! `{module}`: files embedded at {entries} call sites.

use ::std::sync::{Arc, OnceLock};

static DATA: &[u8] = include_bytes!("{data_file}");
static INDEX: OnceLock<Arc<::{facility}::TreeIndex>> = OnceLock::new();

/// The embedded tree index, decoded on first use
pub fn index() -> ::{facility}::Result<Arc<::{facility}::TreeIndex>> {
    if let Some(index) = INDEX.get() {
        return Ok(Arc::clone(index));
    }
    let decoded = Arc::new(::{facility}::codec::decode(DATA)?);
    Ok(Arc::clone(INDEX.get_or_init(|| decoded)))
}

/// Resolver over the embedded index in the given mode
pub fn resolver(mode: ::{facility}::Mode) -> ::{facility}::Result<::{facility}::Resolver> {
    Ok(::{facility}::Resolver::new(mode, index()?))
}

/// Resolver in the mode selected by `EMBEDFS_MODE` or `EMBEDFS_USE_FS`
pub fn configured_resolver() -> ::{facility}::Result<::{facility}::Resolver> {
    let config = ::{facility}::ConfigLoader::load_from_env()?;
    Ok(::{facility}::Resolver::from_config(&config, index()?))
}
"#;
