//! File handles from either backend

use crate::error::{EmbedError, Expected, Result};
use crate::runtime::stream::{disk_name, Stream};
use crate::tree::node::{Metadata, Node};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolution failure held by a handle until its content is accessed
#[derive(Debug, Clone, PartialEq, Eq)]
enum Deferred {
    NotFound(String),
    WrongType(String),
}

impl Deferred {
    fn to_error(&self) -> EmbedError {
        match self {
            Deferred::NotFound(path) => EmbedError::NotFound(path.clone()),
            Deferred::WrongType(path) => EmbedError::wrong_type(path.clone(), Expected::File),
        }
    }
}

#[derive(Debug, Clone)]
enum Backing {
    Baked(Arc<Node>),
    Live(PathBuf),
    Unresolved(Deferred),
}

/// A file, either baked into the program or on disk
#[derive(Debug, Clone)]
pub struct File {
    backing: Backing,
}

impl File {
    /// In-memory file, e.g. to graft with [`Dir::add`](crate::Dir::add)
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::from_node(Arc::new(Node::from_bytes(name, content)))
    }

    /// File on disk, read on every access
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            backing: Backing::Live(path.into()),
        }
    }

    pub(crate) fn from_node(node: Arc<Node>) -> Self {
        let backing = if node.is_dir() {
            Backing::Unresolved(Deferred::WrongType(node.name().to_string()))
        } else {
            Backing::Baked(node)
        };
        Self { backing }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self {
            backing: Backing::Unresolved(Deferred::NotFound(path.into())),
        }
    }

    pub(crate) fn wrong_type(path: impl Into<String>) -> Self {
        Self {
            backing: Backing::Unresolved(Deferred::WrongType(path.into())),
        }
    }

    /// Baked node behind this handle, if any
    pub(crate) fn node(&self) -> Option<&Arc<Node>> {
        match &self.backing {
            Backing::Baked(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_baked(&self) -> bool {
        matches!(self.backing, Backing::Baked(_))
    }

    /// Disk path behind a live handle
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Live(path) => Some(path),
            _ => None,
        }
    }

    /// Full content. Live handles read the disk on every call.
    pub fn contents(&self) -> Result<Vec<u8>> {
        match &self.backing {
            Backing::Baked(node) => Ok(node.content().unwrap_or_default().to_vec()),
            Backing::Live(path) => Ok(fs::read(path)?),
            Backing::Unresolved(deferred) => Err(deferred.to_error()),
        }
    }

    /// Like [`contents`](Self::contents), panicking on failure
    pub fn must_contents(&self) -> Vec<u8> {
        match self.contents() {
            Ok(bytes) => bytes,
            Err(e) => panic!("embedded file contents: {}", e),
        }
    }

    pub fn metadata(&self) -> Result<Metadata> {
        match &self.backing {
            Backing::Baked(node) => Ok(node.metadata().clone()),
            Backing::Live(path) => Ok(Metadata::from_fs(disk_name(path), &fs::metadata(path)?)),
            Backing::Unresolved(deferred) => Err(deferred.to_error()),
        }
    }

    pub fn open(&self) -> Result<Stream> {
        match &self.backing {
            Backing::Baked(node) => Ok(Stream::from_node(Arc::clone(node))),
            Backing::Live(path) => Stream::open_path(path),
            Backing::Unresolved(deferred) => Err(deferred.to_error()),
        }
    }
}
