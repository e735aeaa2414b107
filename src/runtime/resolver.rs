//! Resolves embedding requests against the baked index or the disk

use crate::callsite::CallSite;
use crate::config::EmbedConfig;
use crate::error::{EmbedError, Expected, Result};
use crate::runtime::dir::Dir;
use crate::runtime::file::File;
use crate::runtime::mode::Mode;
use crate::tree::index::{lookup_key, TreeIndex};
use crate::tree::node::Node;
use crate::tree::path::resolve_from;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Entry point behind the `new_dir!` / `new_file!` family of macros.
///
/// The mode is fixed at construction; cloning a resolver shares its index.
#[derive(Debug, Clone)]
pub struct Resolver {
    mode: Mode,
    index: Arc<TreeIndex>,
}

impl Resolver {
    pub fn new(mode: Mode, index: impl Into<Arc<TreeIndex>>) -> Self {
        Self {
            mode,
            index: index.into(),
        }
    }

    pub fn baked(index: impl Into<Arc<TreeIndex>>) -> Self {
        Self::new(Mode::Baked, index)
    }

    /// Resolver that reads everything from disk
    pub fn live() -> Self {
        Self::new(Mode::Live, TreeIndex::new())
    }

    /// Resolver in the configured mode
    pub fn from_config(config: &EmbedConfig, index: impl Into<Arc<TreeIndex>>) -> Self {
        Self::new(config.mode, index)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn new_dir(&self, site: &CallSite, path: &str) -> Result<Dir> {
        match self.mode {
            Mode::Baked => {
                let node = self.lookup(site, path)?;
                if !node.is_dir() {
                    return Err(EmbedError::wrong_type(path, Expected::Directory));
                }
                Dir::from_node(node)
            }
            Mode::Live => Ok(Dir::from_path(self.disk_path(site, path)?)),
        }
    }

    /// Like [`new_dir`](Self::new_dir), panicking on failure
    pub fn must_dir(&self, site: &CallSite, path: &str) -> Dir {
        match self.new_dir(site, path) {
            Ok(dir) => dir,
            Err(e) => panic!("embedded directory {:?}: {}", path, e),
        }
    }

    pub fn new_file(&self, site: &CallSite, path: &str) -> Result<File> {
        match self.mode {
            Mode::Baked => {
                let node = self.lookup(site, path)?;
                if node.is_dir() {
                    return Err(EmbedError::wrong_type(path, Expected::File));
                }
                Ok(File::from_node(node))
            }
            Mode::Live => Ok(File::from_path(self.disk_path(site, path)?)),
        }
    }

    /// Like [`new_file`](Self::new_file), panicking on failure
    pub fn must_file(&self, site: &CallSite, path: &str) -> File {
        match self.new_file(site, path) {
            Ok(file) => file,
            Err(e) => panic!("embedded file {:?}: {}", path, e),
        }
    }

    fn lookup(&self, site: &CallSite, path: &str) -> Result<Arc<Node>> {
        let key = lookup_key(&site.identifier()?, path);
        debug!(key = %key, "Resolving baked entry");
        self.index
            .get(&key)
            .cloned()
            .ok_or(EmbedError::NotFound(key))
    }

    fn disk_path(&self, site: &CallSite, path: &str) -> Result<PathBuf> {
        // Derive the identifier anyway so both modes fail alike on a bad call site
        site.identifier()?;
        let resolved = resolve_from(&site.source_dir()?, path);
        debug!(path = %resolved.display(), "Resolving live entry");
        Ok(resolved)
    }
}
