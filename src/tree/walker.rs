//! Filesystem walker for packing directory structures

use crate::error::{EmbedError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// What the walker does when it meets a symbolic link below the root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Read through the link; link cycles are reported as errors
    #[default]
    Follow,
    /// Leave the link out of the snapshot
    Skip,
    /// Abort the walk
    Error,
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    #[serde(default)]
    pub symlinks: SymlinkPolicy,
}

/// Filesystem entry yielded by the walker
#[derive(Debug, Clone)]
pub enum Entry {
    File {
        path: PathBuf,
        name: String,
        depth: usize,
        metadata: std::fs::Metadata,
    },
    Directory {
        path: PathBuf,
        name: String,
        depth: usize,
        metadata: std::fs::Metadata,
    },
}

impl Entry {
    pub fn depth(&self) -> usize {
        match self {
            Entry::File { depth, .. } | Entry::Directory { depth, .. } => *depth,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Entry::File { path, .. } | Entry::Directory { path, .. } => path,
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the tree below the root, root included.
    ///
    /// Entries come contents-first: every directory appears after all of its
    /// descendants, and siblings are ordered by file name.
    pub fn walk(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.symlinks == SymlinkPolicy::Follow)
            .contents_first(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            let path = entry.path().to_path_buf();

            // The root itself is always resolved
            if entry.depth() > 0
                && entry.path_is_symlink()
                && self.config.symlinks != SymlinkPolicy::Follow
            {
                match self.config.symlinks {
                    SymlinkPolicy::Skip => {
                        debug!(path = %path.display(), "Skipping symlink");
                        continue;
                    }
                    _ => {
                        return Err(EmbedError::Io(std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            format!("Symlink {:?} refused by packing policy", path),
                        )));
                    }
                }
            }

            let metadata = entry.metadata().map_err(|e| walk_error(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let depth = entry.depth();

            if metadata.is_file() {
                trace!(path = %path.display(), size = metadata.len(), "Walked file");
                entries.push(Entry::File {
                    path,
                    name,
                    depth,
                    metadata,
                });
            } else if metadata.is_dir() {
                entries.push(Entry::Directory {
                    path,
                    name,
                    depth,
                    metadata,
                });
            } else {
                // Sockets, fifos and devices have no snapshot form
                debug!(path = %path.display(), "Skipping special file");
            }
        }

        Ok(entries)
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> EmbedError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
            EmbedError::NotFound(path.display().to_string())
        }
        Some(io) => EmbedError::Io(io),
        None => EmbedError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to walk directory: {}", message),
        )),
    }
}
