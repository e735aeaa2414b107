//! Snapshot node types

use crate::error::{EmbedError, Expected, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// File or directory metadata captured at pack time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub size: u64,
    /// Permission bits (`0o7777` mask)
    pub mode: u32,
    /// Modification time in nanoseconds relative to the Unix epoch
    pub modified_ns: i64,
    pub is_dir: bool,
}

impl Metadata {
    /// Capture metadata from a filesystem stat result
    pub fn from_fs(name: impl Into<String>, meta: &std::fs::Metadata) -> Self {
        let modified_ns = meta.modified().map(unix_nanos).unwrap_or(0);
        Self {
            name: name.into(),
            size: meta.len(),
            mode: permission_bits(meta),
            modified_ns,
            is_dir: meta.is_dir(),
        }
    }

    /// Metadata for a directory that only exists because something was grafted below it
    pub fn synthetic_dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            mode: 0o755,
            modified_ns: 0,
            is_dir: true,
        }
    }

    /// Metadata for an in-memory file built by hand
    pub fn synthetic_file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mode: 0o644,
            modified_ns: 0,
            is_dir: false,
        }
    }

    pub fn modified(&self) -> SystemTime {
        if self.modified_ns >= 0 {
            UNIX_EPOCH + Duration::from_nanos(self.modified_ns as u64)
        } else {
            UNIX_EPOCH - Duration::from_nanos(self.modified_ns.unsigned_abs())
        }
    }
}

fn unix_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_nanos()).unwrap_or(i64::MAX),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    match (meta.is_dir(), meta.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

/// Payload of a node: bytes for a file, named children for a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File { content: Vec<u8> },
    Dir { children: BTreeMap<String, Arc<Node>> },
}

/// One file or directory in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    metadata: Metadata,
    kind: NodeKind,
}

impl Node {
    pub fn file(metadata: Metadata, content: Vec<u8>) -> Self {
        Self {
            name: metadata.name.clone(),
            metadata,
            kind: NodeKind::File { content },
        }
    }

    /// In-memory file with synthetic metadata, for grafting hand-built entries
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let metadata = Metadata::synthetic_file(name, content.len() as u64);
        Self::file(metadata, content)
    }

    pub fn dir(metadata: Metadata, children: BTreeMap<String, Arc<Node>>) -> Self {
        Self {
            name: metadata.name.clone(),
            metadata,
            kind: NodeKind::Dir { children },
        }
    }

    pub fn empty_dir(name: impl Into<String>) -> Self {
        Self::dir(Metadata::synthetic_dir(name), BTreeMap::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir { .. })
    }

    /// File bytes; `None` for directories
    pub fn content(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Dir { .. } => None,
        }
    }

    /// Child map; `None` for files
    pub fn children(&self) -> Option<&BTreeMap<String, Arc<Node>>> {
        match &self.kind {
            NodeKind::Dir { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Metadata of each child, ordered by name. `None` for files.
    pub fn list(&self) -> Option<Vec<Metadata>> {
        self.children()
            .map(|children| children.values().map(|c| c.metadata.clone()).collect())
    }

    /// Rename the node (and its metadata) to `name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.metadata.name = name.clone();
        self.name = name;
        self
    }

    /// Number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        match &self.kind {
            NodeKind::File { .. } => 1,
            NodeKind::Dir { children } => {
                1 + children.values().map(|c| c.node_count()).sum::<usize>()
            }
        }
    }

    /// Total file bytes in this subtree
    pub fn content_len(&self) -> u64 {
        match &self.kind {
            NodeKind::File { content } => content.len() as u64,
            NodeKind::Dir { children } => children.values().map(|c| c.content_len()).sum(),
        }
    }

    /// Descend by child names.
    ///
    /// A node without children (a file or an empty directory) ends the walk
    /// with `None` when segments remain.
    pub fn walk<S: AsRef<str>>(root: &Arc<Node>, segments: &[S]) -> Option<Arc<Node>> {
        let mut cur = root;
        for segment in segments {
            let children = cur.children().filter(|c| !c.is_empty())?;
            cur = children.get(segment.as_ref())?;
        }
        Some(Arc::clone(cur))
    }

    /// Insert `node` at `segments` below `root`, creating intermediate directories.
    ///
    /// Shared subtrees are cloned on write, so other holders of `root` keep
    /// the tree they had.
    pub fn graft<S: AsRef<str>>(root: &mut Arc<Node>, segments: &[S], node: Node) -> Result<()> {
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| EmbedError::NotFound("empty graft path".to_string()))?;

        let mut cur: &mut Node = Arc::make_mut(root);
        for segment in parents {
            let segment = segment.as_ref();
            let children = match &mut cur.kind {
                NodeKind::Dir { children } => children,
                NodeKind::File { .. } => {
                    return Err(EmbedError::wrong_type(cur.name.clone(), Expected::Directory))
                }
            };
            let child = children
                .entry(segment.to_string())
                .or_insert_with(|| Arc::new(Node::empty_dir(segment)));
            cur = Arc::make_mut(child);
        }

        let last = last.as_ref();
        match &mut cur.kind {
            NodeKind::Dir { children } => {
                children.insert(last.to_string(), Arc::new(node.with_name(last)));
                Ok(())
            }
            NodeKind::File { .. } => Err(EmbedError::wrong_type(cur.name.clone(), Expected::Directory)),
        }
    }
}
