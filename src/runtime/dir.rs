//! Directory handles from either backend

use crate::error::{EmbedError, Expected, Result};
use crate::runtime::file::File;
use crate::runtime::stream::{disk_name, Stream};
use crate::tree::node::{Metadata, Node};
use crate::tree::path::{join_onto, join_segments, normalize_segments, split_path};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
enum Root {
    Baked(Arc<Node>),
    Live(PathBuf),
}

/// A directory, either baked into the program or on disk.
///
/// Files added with [`add`](Dir::add) that cannot be grafted into the baked
/// tree (live directories, disk-backed files) are kept in an overlay keyed by
/// their normalized relative path. The overlay is consulted before the
/// backend.
#[derive(Debug, Clone)]
pub struct Dir {
    root: Root,
    overlay: BTreeMap<String, File>,
}

impl Dir {
    /// Directory over a baked node; a file node is `WrongType`
    pub fn from_node(node: Arc<Node>) -> Result<Self> {
        if !node.is_dir() {
            return Err(EmbedError::wrong_type(node.name(), Expected::Directory));
        }
        Ok(Self {
            root: Root::Baked(node),
            overlay: BTreeMap::new(),
        })
    }

    /// Empty in-memory directory
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            root: Root::Baked(Arc::new(Node::empty_dir(name))),
            overlay: BTreeMap::new(),
        }
    }

    /// Directory on disk. Nothing is read until a request is made.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            root: Root::Live(path.into()),
            overlay: BTreeMap::new(),
        }
    }

    pub fn is_baked(&self) -> bool {
        matches!(self.root, Root::Baked(_))
    }

    /// Disk path behind a live directory
    pub fn path(&self) -> Option<&Path> {
        match &self.root {
            Root::Live(path) => Some(path),
            Root::Baked(_) => None,
        }
    }

    /// Open a file or directory by relative path.
    ///
    /// `"/sub/file.txt"` and `"sub/file.txt"` are the same request.
    /// Directories holding added files open as listings that include them.
    pub fn open(&self, path: &str) -> Result<Stream> {
        let segments = split_path(path);
        if let Some(file) = self.overlay.get(&join_segments(&segments)) {
            return file.open();
        }
        if self.has_overlay_below(&segments) {
            let entries = self.read(&segments)?;
            let metadata = self.backend_metadata(&segments).unwrap_or_else(|| {
                Metadata::synthetic_dir(segments.last().cloned().unwrap_or_default())
            });
            return Ok(Stream::from_listing(metadata, entries));
        }

        match &self.root {
            Root::Baked(node) => Node::walk(node, &segments)
                .map(Stream::from_node)
                .ok_or_else(|| EmbedError::NotFound(path.trim().to_string())),
            Root::Live(base) => Stream::open_path(&join_onto(base, &segments)),
        }
    }

    /// List the directory at `segments`, sorted by name
    pub fn read<S: AsRef<str>>(&self, segments: &[S]) -> Result<Vec<Metadata>> {
        let segments = normalize_segments(segments);
        let listed = match &self.root {
            Root::Baked(node) => match Node::walk(node, &segments) {
                Some(target) => target.list().ok_or_else(|| {
                    EmbedError::wrong_type(join_segments(&segments), Expected::Directory)
                }),
                None => Err(EmbedError::NotFound(join_segments(&segments))),
            },
            Root::Live(base) => list_disk_dir(&join_onto(base, &segments)),
        };

        let overlaid = self.overlay_children(&segments)?;
        if overlaid.is_empty() {
            return listed;
        }

        // The overlay can create a directory the backend does not have
        let mut entries: BTreeMap<String, Metadata> = match listed {
            Ok(list) => list.into_iter().map(|m| (m.name.clone(), m)).collect(),
            Err(e) if e.is_not_found() => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        entries.extend(overlaid);
        Ok(entries.into_values().collect())
    }

    /// Handle for the file at `segments`. Resolution errors surface when
    /// the handle's content is accessed.
    pub fn file<S: AsRef<str>>(&self, segments: &[S]) -> File {
        let segments = normalize_segments(segments);
        let key = join_segments(&segments);
        if let Some(file) = self.overlay.get(&key) {
            return file.clone();
        }

        match &self.root {
            Root::Baked(node) => match Node::walk(node, &segments) {
                Some(target) if target.is_dir() => File::wrong_type(key),
                Some(target) => File::from_node(target),
                None => File::not_found(key),
            },
            Root::Live(base) => File::from_path(join_onto(base, &segments)),
        }
    }

    /// Subdirectory at `segments`, carrying the overlay entries below it
    pub fn dir<S: AsRef<str>>(&self, segments: &[S]) -> Result<Dir> {
        let segments = normalize_segments(segments);
        let prefix = join_segments(&segments);
        let overlay: BTreeMap<String, File> = self
            .overlay
            .iter()
            .filter_map(|(key, file)| {
                let rest = key.strip_prefix(&prefix)?;
                let rest = if prefix.is_empty() { rest } else { rest.strip_prefix('/')? };
                Some((rest.to_string(), file.clone()))
            })
            .collect();

        let root = match &self.root {
            Root::Baked(node) => match Node::walk(node, &segments) {
                Some(target) if target.is_dir() => Root::Baked(target),
                Some(_) => return Err(EmbedError::wrong_type(prefix, Expected::Directory)),
                None if !overlay.is_empty() => {
                    let name = segments.last().map(String::as_str).unwrap_or_default();
                    Root::Baked(Arc::new(Node::empty_dir(name)))
                }
                None => return Err(EmbedError::NotFound(prefix)),
            },
            Root::Live(base) => Root::Live(join_onto(base, &segments)),
        };
        Ok(Dir { root, overlay })
    }

    pub fn metadata(&self) -> Result<Metadata> {
        match &self.root {
            Root::Baked(node) => Ok(node.metadata().clone()),
            Root::Live(path) => Ok(Metadata::from_fs(disk_name(path), &fs::metadata(path)?)),
        }
    }

    /// Graft `file` at the relative `path`, creating intermediate directories.
    ///
    /// Baked files are grafted into a private copy of the baked tree; anything
    /// else goes to the overlay.
    pub fn add(&mut self, path: &str, file: File) -> Result<&mut Dir> {
        let segments = split_path(path);
        if segments.is_empty() {
            return Err(EmbedError::NotFound(format!("empty path {:?}", path)));
        }

        match (&mut self.root, file.node().cloned()) {
            (Root::Baked(root), Some(node)) => {
                Node::graft(root, &segments, Node::clone(&node))?;
                trace!(path = %join_segments(&segments), "Grafted baked file");
            }
            _ => {
                trace!(path = %join_segments(&segments), "Added overlay file");
                self.overlay.insert(join_segments(&segments), file);
            }
        }
        Ok(self)
    }

    fn has_overlay_below(&self, segments: &[String]) -> bool {
        self.overlay.keys().any(|key| {
            let key_segments = split_path(key);
            key_segments.len() > segments.len() && key_segments.starts_with(segments)
        })
    }

    /// Metadata of the backend entry at `segments`, if there is one
    fn backend_metadata(&self, segments: &[String]) -> Option<Metadata> {
        match &self.root {
            Root::Baked(node) => Node::walk(node, segments).map(|n| n.metadata().clone()),
            Root::Live(base) => {
                let path = join_onto(base, segments);
                let meta = fs::metadata(&path).ok()?;
                Some(Metadata::from_fs(disk_name(&path), &meta))
            }
        }
    }

    /// Entries the overlay contributes directly below `segments`
    fn overlay_children(&self, segments: &[String]) -> Result<BTreeMap<String, Metadata>> {
        let mut children = BTreeMap::new();
        for (key, file) in &self.overlay {
            let key_segments = split_path(key);
            if key_segments.len() <= segments.len() || !key_segments.starts_with(segments) {
                continue;
            }
            let name = key_segments[segments.len()].clone();
            let metadata = if key_segments.len() == segments.len() + 1 {
                Metadata {
                    name: name.clone(),
                    ..file.metadata()?
                }
            } else {
                Metadata::synthetic_dir(name.clone())
            };
            children.insert(name, metadata);
        }
        Ok(children)
    }
}

/// List a disk directory, following symlinks, sorted by name
pub(crate) fn list_disk_dir(path: &Path) -> Result<Vec<Metadata>> {
    let meta = fs::metadata(path)?;
    if !meta.is_dir() {
        return Err(EmbedError::wrong_type(
            path.display().to_string(),
            Expected::Directory,
        ));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = fs::metadata(entry.path())?;
        entries.push(Metadata::from_fs(name, &meta));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
