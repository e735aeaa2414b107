//! Tree index container format
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! [magic: 8 bytes "EMBFSIDX"][version: u32][payload_len: u64][payload: bincode(TreeIndex)]
//! ```

use crate::error::{EmbedError, Result};
use crate::tree::index::TreeIndex;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

pub const MAGIC: &[u8; 8] = b"EMBFSIDX";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 8 + 4 + 8;

/// Encode an index into a self-describing container
pub fn encode(index: &TreeIndex) -> Result<Vec<u8>> {
    let payload = bincode::serialize(index)
        .map_err(|e| EmbedError::Codec(format!("Failed to serialize tree index: {}", e)))?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a container produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<TreeIndex> {
    if bytes.len() < HEADER_LEN {
        return Err(EmbedError::Codec(format!(
            "Container too short: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[..8] != MAGIC {
        return Err(EmbedError::Codec("Bad magic".to_string()));
    }

    let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if version != FORMAT_VERSION {
        return Err(EmbedError::Codec(format!(
            "Unsupported container version: {}",
            version
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[12..HEADER_LEN]);
    let payload_len = u64::from_le_bytes(len_bytes);
    let payload = &bytes[HEADER_LEN..];
    if payload.len() as u64 != payload_len {
        return Err(EmbedError::Codec(format!(
            "Payload length mismatch: header says {}, found {}",
            payload_len,
            payload.len()
        )));
    }

    bincode::deserialize(payload)
        .map_err(|e| EmbedError::Codec(format!("Failed to deserialize tree index: {}", e)))
}

/// Write an encoded index to disk atomically (temporary file + rename)
#[instrument(skip(index, path), fields(path = %path.display()))]
pub fn write_to_path(index: &TreeIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = encode(index)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &bytes)?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        EmbedError::Io(e)
    })?;

    debug!(bytes = bytes.len(), entries = index.len(), "Wrote tree index");
    Ok(())
}

pub fn read_from_path(path: &Path) -> Result<TreeIndex> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}
