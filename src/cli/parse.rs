//! CLI parse: clap types for embedgen. No behavior; definitions only.

use crate::tree::walker::SymlinkPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Embedgen - bake files referenced by embedding calls into a tree index
#[derive(Parser, Debug)]
#[command(name = "embedgen")]
#[command(about = "Generate embedded file trees for programs using embedfs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (where embedfs.toml is looked up)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan sources and write the generated module and data file
    Generate {
        /// Output directory for mod.rs and embedded.bin
        #[arg(long)]
        out: PathBuf,
        /// Generated module name (default: output directory name)
        #[arg(long)]
        module: Option<String>,
        /// Package whose layout determines module paths (default: discovered per file)
        #[arg(long)]
        manifest_dir: Option<PathBuf>,
        /// Crate names the embedding macros are imported from (repeatable)
        #[arg(long = "facility")]
        facilities: Vec<String>,
        /// Symlink handling while packing
        #[arg(long, value_enum)]
        symlinks: Option<SymlinkArg>,
        /// Source files or directories to scan
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// List the entries of a generated data file
    Inspect {
        /// Path to embedded.bin
        file: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymlinkArg {
    Follow,
    Skip,
    Error,
}

impl From<SymlinkArg> for SymlinkPolicy {
    fn from(arg: SymlinkArg) -> Self {
        match arg {
            SymlinkArg::Follow => SymlinkPolicy::Follow,
            SymlinkArg::Skip => SymlinkPolicy::Skip,
            SymlinkArg::Error => SymlinkPolicy::Error,
        }
    }
}
