//! CLI output: index listings and error mapping.

use crate::tree::index::TreeIndex;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;

/// One row of an index listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRow {
    pub key: String,
    pub kind: &'static str,
    pub nodes: usize,
    pub bytes: u64,
}

pub fn index_rows(index: &TreeIndex) -> Vec<IndexRow> {
    index
        .iter()
        .map(|(key, node)| IndexRow {
            key: key.to_string(),
            kind: if node.is_dir() { "dir" } else { "file" },
            nodes: node.node_count(),
            bytes: node.content_len(),
        })
        .collect()
}

pub fn format_index_text(index: &TreeIndex) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Key", "Kind", "Nodes", "Bytes"]);
    for row in index_rows(index) {
        table.add_row(vec![
            row.key,
            row.kind.to_string(),
            row.nodes.to_string(),
            row.bytes.to_string(),
        ]);
    }
    format!("{}\n{} entries", table, index.len())
}

pub fn format_index_json(index: &TreeIndex) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&index_rows(index))
}

/// Map errors to a string for CLI output, with their cause chain.
pub fn map_error(e: &anyhow::Error) -> String {
    format!("{:#}", e)
}
