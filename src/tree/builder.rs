//! Packer: snapshot a disk path into a node tree

use crate::error::{EmbedError, Expected, Result};
use crate::tree::node::{Metadata, Node};
use crate::tree::walker::{Entry, Walker, WalkerConfig};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace};

/// Builds [`Node`] snapshots from the filesystem
#[derive(Debug, Clone, Default)]
pub struct Packer {
    walker_config: WalkerConfig,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set walker config (symlink policy). Applies to entries below the packed root.
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Pack a file or a directory, whichever is at `path`
    pub fn pack(&self, path: &Path) -> Result<Node> {
        if stat(path)?.is_dir() {
            self.pack_dir(path)
        } else {
            self.pack_file(path)
        }
    }

    /// Pack a single file. Content is copied byte for byte.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn pack_file(&self, path: &Path) -> Result<Node> {
        let meta = stat(path)?;
        if meta.is_dir() {
            return Err(EmbedError::wrong_type(path.display().to_string(), Expected::File));
        }

        let content = read_file(path)?;
        trace!(size = content.len(), "Packed file");
        Ok(Node::file(Metadata::from_fs(base_name(path), &meta), content))
    }

    /// Pack a directory recursively
    ///
    /// The walker yields entries contents-first, so every child is complete
    /// before its parent directory is assembled.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn pack_dir(&self, path: &Path) -> Result<Node> {
        let meta = stat(path)?;
        if !meta.is_dir() {
            return Err(EmbedError::wrong_type(
                path.display().to_string(),
                Expected::Directory,
            ));
        }

        let start = Instant::now();
        let walker = Walker::with_config(path.to_path_buf(), self.walker_config.clone());
        let entries = match walker.walk() {
            Ok(e) => {
                debug!(entry_count = e.len(), "Walked directory");
                e
            }
            Err(e) => {
                error!("Directory walk failed: {}", e);
                return Err(e);
            }
        };

        // levels[d] holds the finished children of the directory currently open at depth d - 1
        let mut levels: Vec<BTreeMap<String, Arc<Node>>> = Vec::new();
        let mut root = None;

        for entry in entries {
            let depth = entry.depth();
            while levels.len() <= depth + 1 {
                levels.push(BTreeMap::new());
            }

            let node = match entry {
                Entry::File {
                    path: file_path,
                    name,
                    metadata,
                    ..
                } => {
                    let content = read_file(&file_path)?;
                    Node::file(Metadata::from_fs(name, &metadata), content)
                }
                Entry::Directory { name, metadata, .. } => {
                    let children = std::mem::take(&mut levels[depth + 1]);
                    Node::dir(Metadata::from_fs(name, &metadata), children)
                }
            };

            if depth == 0 {
                root = Some(node.with_name(base_name(path)));
            } else {
                levels[depth].insert(node.name().to_string(), Arc::new(node));
            }
        }

        let root = root.ok_or_else(|| EmbedError::NotFound(path.display().to_string()))?;
        info!(
            node_count = root.node_count(),
            bytes = root.content_len(),
            duration_ms = start.elapsed().as_millis(),
            "Directory packed"
        );
        Ok(root)
    }
}

fn stat(path: &Path) -> Result<std::fs::Metadata> {
    std::fs::metadata(path).map_err(|e| not_found_or_io(path, e))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        error!(path = %path.display(), "Failed to read file: {}", e);
        not_found_or_io(path, e)
    })
}

fn not_found_or_io(path: &Path, err: std::io::Error) -> EmbedError {
    if err.kind() == std::io::ErrorKind::NotFound {
        EmbedError::NotFound(path.display().to_string())
    } else {
        EmbedError::Io(err)
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
