//! Readable, seekable handle returned by [`Dir::open`](crate::Dir::open)

use crate::error::{EmbedError, Expected, Result};
use crate::runtime::dir::list_disk_dir;
use crate::tree::node::{Metadata, Node};
use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Borrow a node's content for a `Cursor` without copying it
#[derive(Debug, Clone)]
struct NodeBytes(Arc<Node>);

impl AsRef<[u8]> for NodeBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.content().unwrap_or(&[])
    }
}

#[derive(Debug)]
enum Source {
    Node(Cursor<NodeBytes>),
    DiskFile { file: fs::File, path: PathBuf },
    DiskDir { path: PathBuf },
    /// Directory whose listing was assembled up front
    Listing {
        metadata: Metadata,
        entries: Vec<Metadata>,
    },
}

/// An open file or directory from either backend
#[derive(Debug)]
pub struct Stream {
    source: Source,
}

impl Stream {
    pub(crate) fn from_node(node: Arc<Node>) -> Self {
        Self {
            source: Source::Node(Cursor::new(NodeBytes(node))),
        }
    }

    pub(crate) fn from_listing(metadata: Metadata, entries: Vec<Metadata>) -> Self {
        Self {
            source: Source::Listing { metadata, entries },
        }
    }

    pub(crate) fn open_path(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        let source = if meta.is_dir() {
            Source::DiskDir {
                path: path.to_path_buf(),
            }
        } else {
            Source::DiskFile {
                file: fs::File::open(path)?,
                path: path.to_path_buf(),
            }
        };
        Ok(Self { source })
    }

    pub fn is_dir(&self) -> bool {
        match &self.source {
            Source::Node(cursor) => cursor.get_ref().0.is_dir(),
            Source::DiskFile { .. } => false,
            Source::DiskDir { .. } | Source::Listing { .. } => true,
        }
    }

    pub fn metadata(&self) -> Result<Metadata> {
        match &self.source {
            Source::Node(cursor) => Ok(cursor.get_ref().0.metadata().clone()),
            Source::DiskFile { file, path } => Ok(Metadata::from_fs(disk_name(path), &file.metadata()?)),
            Source::DiskDir { path } => Ok(Metadata::from_fs(disk_name(path), &fs::metadata(path)?)),
            Source::Listing { metadata, .. } => Ok(metadata.clone()),
        }
    }

    /// Children of an open directory, sorted by name
    pub fn readdir(&self) -> Result<Vec<Metadata>> {
        match &self.source {
            Source::Node(cursor) => {
                let node = &cursor.get_ref().0;
                node.list()
                    .ok_or_else(|| EmbedError::wrong_type(node.name(), Expected::Directory))
            }
            Source::DiskFile { path, .. } => Err(EmbedError::wrong_type(
                path.display().to_string(),
                Expected::Directory,
            )),
            Source::DiskDir { path } => list_disk_dir(path),
            Source::Listing { entries, .. } => Ok(entries.clone()),
        }
    }

    /// Release the handle. Dropping it has the same effect.
    pub fn close(self) -> Result<()> {
        Ok(())
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.source {
            Source::Node(cursor) => {
                if cursor.get_ref().0.is_dir() {
                    return Err(is_a_directory(cursor.get_ref().0.name()));
                }
                cursor.read(buf)
            }
            Source::DiskFile { file, .. } => file.read(buf),
            Source::DiskDir { path } => Err(is_a_directory(&path.display().to_string())),
            Source::Listing { metadata, .. } => Err(is_a_directory(&metadata.name)),
        }
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.source {
            Source::Node(cursor) => cursor.seek(pos),
            Source::DiskFile { file, .. } => file.seek(pos),
            Source::DiskDir { .. } | Source::Listing { .. } => Ok(0),
        }
    }
}

fn is_a_directory(name: &str) -> io::Error {
    EmbedError::wrong_type(name, Expected::File).into_io()
}

pub(crate) fn disk_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
