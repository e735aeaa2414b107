//! Path canonicalization and relative path normalization

use crate::error::{EmbedError, Result};
use std::path::{Component, Path, PathBuf};

/// Canonicalize a disk path, reporting a missing path as `NotFound`
pub fn canonicalize_path(path: &Path) -> Result<PathBuf> {
    // Use dunce for cross-platform canonicalization
    dunce::canonicalize(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EmbedError::NotFound(path.display().to_string())
        } else {
            EmbedError::Io(e)
        }
    })
}

/// Split a relative path into clean segments.
///
/// Surrounding whitespace and leading separators are dropped, empty and `.`
/// segments are skipped, and `..` removes the previous segment without ever
/// climbing above the root. Both `/` and `\` are accepted as separators.
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for part in path.trim().split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other.to_string()),
        }
    }
    segments
}

/// Normalize caller-provided segments, each of which may itself contain separators
pub fn normalize_segments<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    let joined = segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    split_path(&joined)
}

/// Render segments back into a `/`-separated relative path
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join clean segments onto a base directory
pub fn join_onto<S: AsRef<str>>(base: &Path, segments: &[S]) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(segment.as_ref());
    }
    path
}

/// Resolve an embedding literal against the directory of its source file.
///
/// Unlike [`split_path`], `..` climbs out of `base` the way a plain path join
/// does. Resolution is lexical; nothing is read from disk.
pub fn resolve_from(base: &Path, literal: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in literal.trim().split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => match path.components().next_back() {
                Some(Component::Normal(_)) => {
                    path.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => path.push(".."),
            },
            other => path.push(other),
        }
    }
    path
}
