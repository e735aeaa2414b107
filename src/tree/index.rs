//! Tree index: lookup key to root node

use crate::error::{EmbedError, Result};
use crate::tree::node::Node;
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Separator between the call-site identifier and the literal path in a lookup key
pub const KEY_SEPARATOR: char = '|';

/// Build the lookup key for a call-site identifier and the literal path argument
pub fn lookup_key(identifier: &str, literal: &str) -> String {
    format!("{}{}{}", identifier, KEY_SEPARATOR, literal)
}

/// Mapping from lookup key to the root node embedded for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeIndex {
    entries: BTreeMap<String, Arc<Node>>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root node under `key`, returning the node it replaced.
    ///
    /// Identical keys describe the same embedding request, so the last write wins.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Arc<Node>> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), Arc::new(node));
        if previous.is_some() {
            warn!(key = %key, "Tree index key overwritten");
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Node>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Graft `node` at the relative `path` below the root stored under `key`.
    ///
    /// Used to merge hand-built entries into a decoded index before it is
    /// handed to a resolver.
    pub fn graft(&mut self, key: &str, path: &str, node: Node) -> Result<()> {
        let root = self
            .entries
            .get_mut(key)
            .ok_or_else(|| EmbedError::NotFound(key.to_string()))?;
        Node::graft(root, &path::split_path(path), node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Node>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
