//! Call-site scanner
//!
//! Finds embedding macro invocations in source files, packs what they point
//! at, and keys each packed node the way the runtime will look it up.

pub mod unit;
pub mod visitor;

pub use unit::{CargoUnits, CrateLayout, UnitResolver};
pub use visitor::{find_calls, EntryPoint, FoundCall};

use crate::callsite;
use crate::error::{EmbedError, Result};
use crate::tree::builder::Packer;
use crate::tree::index::{lookup_key, TreeIndex};
use crate::tree::path::resolve_from;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Crate names the embedding macros are imported from by default
pub const DEFAULT_FACILITIES: &[&str] = &["embedfs"];

/// Scans source files into a [`TreeIndex`]
pub struct Scanner<'a> {
    facilities: Vec<String>,
    packer: Packer,
    units: &'a dyn UnitResolver,
}

impl<'a> Scanner<'a> {
    pub fn new(units: &'a dyn UnitResolver) -> Self {
        Self {
            facilities: DEFAULT_FACILITIES.iter().map(|s| s.to_string()).collect(),
            packer: Packer::new(),
            units,
        }
    }

    pub fn with_facilities(mut self, facilities: Vec<String>) -> Self {
        self.facilities = facilities;
        self
    }

    pub fn with_packer(mut self, packer: Packer) -> Self {
        self.packer = packer;
        self
    }

    /// Scan one source file, inserting a node for every embedding call.
    ///
    /// Returns the number of calls found.
    #[instrument(skip(self, path, index), fields(path = %path.display()))]
    pub fn scan_file(&self, path: &Path, index: &mut TreeIndex) -> Result<usize> {
        let source = fs::read_to_string(path)?;
        let calls = find_calls(path, &source, &self.facilities)?;
        if calls.is_empty() {
            debug!("No embedding calls");
            return Ok(0);
        }

        let unit_path = self.units.module_path(path)?;
        let source_dir = path.parent().ok_or_else(|| {
            EmbedError::CallerInfo(format!("no parent directory for {}", path.display()))
        })?;
        let file_name = path.to_string_lossy();

        for call in &calls {
            let mut module_path = unit_path.clone();
            for module in &call.inline_modules {
                module_path.push_str("::");
                module_path.push_str(module);
            }
            let identifier = callsite::identifier(&module_path, &file_name)?;

            let target = resolve_from(source_dir, &call.literal);
            let node = if call.entry.is_dir() {
                self.packer.pack_dir(&target)
            } else {
                self.packer.pack_file(&target)
            }
            .map_err(|e| located(path, call, e))?;

            let key = lookup_key(&identifier, &call.literal);
            debug!(
                key = %key,
                macro_name = call.entry.name(),
                nodes = node.node_count(),
                "Embedded call site"
            );
            index.insert(key, node);
        }

        info!(calls = calls.len(), "Scanned source file");
        Ok(calls.len())
    }
}

// Packing failures keep their kind; only missing targets gain the call's location.
fn located(path: &Path, call: &FoundCall, err: EmbedError) -> EmbedError {
    match err {
        EmbedError::NotFound(target) => EmbedError::NotFound(format!(
            "{} (from {}!(.., {:?}) at {}:{}:{})",
            target,
            call.entry.name(),
            call.literal,
            path.display(),
            call.line,
            call.column
        )),
        other => other,
    }
}
