//! Error types for embedding generation and runtime resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`EmbedError`].
///
/// Fallible and panicking entry points report the same kind; only the
/// delivery differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CallerInfo,
    NotFound,
    WrongType,
    GenerationSyntax,
    Io,
    Codec,
    Config,
}

/// Node type expected by an operation that hit the other one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    File,
    Directory,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::File => write!(f, "file"),
            Expected::Directory => write!(f, "directory"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Could not retrieve caller information: {0}")]
    CallerInfo(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wrong type at {path}: expected a {expected}")]
    WrongType { path: String, expected: Expected },

    #[error("{}:{line}:{column}: {message}", file.display())]
    GenerationSyntax {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tree index: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EmbedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmbedError::CallerInfo(_) => ErrorKind::CallerInfo,
            EmbedError::NotFound(_) => ErrorKind::NotFound,
            EmbedError::WrongType { .. } => ErrorKind::WrongType,
            EmbedError::GenerationSyntax { .. } => ErrorKind::GenerationSyntax,
            EmbedError::Io(_) => ErrorKind::Io,
            EmbedError::Codec(_) => ErrorKind::Codec,
            EmbedError::Config(_) => ErrorKind::Config,
        }
    }

    /// True for a baked-mode miss and for a live-mode `io::ErrorKind::NotFound`.
    ///
    /// The underlying I/O error is left untouched; this only classifies it.
    pub fn is_not_found(&self) -> bool {
        match self {
            EmbedError::NotFound(_) => true,
            EmbedError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn wrong_type(path: impl Into<String>, expected: Expected) -> Self {
        EmbedError::WrongType {
            path: path.into(),
            expected,
        }
    }

    /// Converts into an `io::Error` for the `Read`/`Seek` surface of a stream.
    pub(crate) fn into_io(self) -> std::io::Error {
        match self {
            EmbedError::Io(e) => e,
            EmbedError::NotFound(msg) => {
                std::io::Error::new(std::io::ErrorKind::NotFound, msg)
            }
            other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        }
    }
}

impl From<config::ConfigError> for EmbedError {
    fn from(err: config::ConfigError) -> Self {
        EmbedError::Config(err.to_string())
    }
}

pub type Result<T, E = EmbedError> = std::result::Result<T, E>;
