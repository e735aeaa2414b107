//! Embedfs: files and directories compiled into the program
//!
//! A generator (`embedgen`) scans the program's source for embedding calls,
//! snapshots the files they name and writes a tree index that the program
//! `include_bytes!`. At run time a [`Resolver`] answers the same calls from
//! that index, or from the real filesystem in live mode, behind one
//! [`Dir`]/[`File`] interface.
//!
//! ```ignore
//! mod embedded;
//!
//! let resolver = embedded::configured_resolver()?;
//! let templates = embedfs::must_dir!(resolver, "templates");
//! let page = templates.file(&["index.html"]).contents()?;
//! ```

pub mod callsite;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod runtime;
pub mod scan;
pub mod tree;

pub use callsite::CallSite;
pub use config::{ConfigLoader, EmbedConfig};
pub use error::{EmbedError, ErrorKind, Result};
pub use runtime::{Dir, File, Mode, Resolver, Stream};
pub use tree::index::TreeIndex;
pub use tree::node::{Metadata, Node};
