//! Call-site identity shared by the generator and the runtime.
//!
//! A call site is named by the module that contains it and the base name of
//! its source file: `"<module path>/<file base name>"`. The scanner derives
//! the module path statically; at run time the embedding macros capture
//! `module_path!()` and `file!()` where they are expanded. Both sides go
//! through [`identifier`], so any wrapper function between the macro and the
//! resolver leaves the identifier unchanged.

use crate::error::{EmbedError, Result};
use std::path::{Path, PathBuf};

/// Build the identifier for a module path and a source file path
pub fn identifier(module_path: &str, source_file: &str) -> Result<String> {
    if module_path.is_empty() {
        return Err(EmbedError::CallerInfo("empty module path".to_string()));
    }
    let base = file_base_name(source_file).ok_or_else(|| {
        EmbedError::CallerInfo(format!("no file name in {:?}", source_file))
    })?;
    Ok(format!("{}/{}", module_path, base))
}

// file!() uses the host separator, while paths handed to the scanner may use
// either; split on both so the two sides agree.
fn file_base_name(source_file: &str) -> Option<&str> {
    source_file
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty())
}

/// Identity of one embedding call, captured at macro expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    module_path: &'static str,
    file: &'static str,
    manifest_dir: Option<&'static str>,
}

impl CallSite {
    pub const fn new(
        module_path: &'static str,
        file: &'static str,
        manifest_dir: Option<&'static str>,
    ) -> Self {
        Self {
            module_path,
            file,
            manifest_dir,
        }
    }

    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn identifier(&self) -> Result<String> {
        identifier(self.module_path, self.file)
    }

    /// Directory holding the call site's source file on this machine.
    ///
    /// `file!()` is relative to the directory rustc was invoked from, which
    /// for Cargo is the workspace root, so the manifest directory and its
    /// ancestors are tried in turn.
    pub fn source_dir(&self) -> Result<PathBuf> {
        let file = Path::new(self.file);
        let source = if file.is_absolute() {
            Some(file.to_path_buf())
        } else {
            self.manifest_dir.and_then(|root| {
                Path::new(root)
                    .ancestors()
                    .map(|dir| dir.join(file))
                    .find(|candidate| candidate.is_file())
            })
        };

        let source = match source {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir()?;
                let candidate = cwd.join(file);
                if !candidate.is_file() {
                    return Err(EmbedError::CallerInfo(format!(
                        "cannot locate source file {:?}",
                        self.file
                    )));
                }
                candidate
            }
        };

        source
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| EmbedError::CallerInfo(format!("no parent for {:?}", self.file)))
    }
}

/// Capture the [`CallSite`] of the invocation
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(
            ::core::module_path!(),
            ::core::file!(),
            ::core::option_env!("CARGO_MANIFEST_DIR"),
        )
    };
}

/// Open an embedded directory, returning `Result<Dir, EmbedError>`.
///
/// `new_dir!(resolver, "assets")`; the path must be a string literal so the
/// generator can read it without running the program.
#[macro_export]
macro_rules! new_dir {
    ($resolver:expr, $path:literal $(,)?) => {
        $crate::Resolver::new_dir(&$resolver, &$crate::call_site!(), $path)
    };
}

/// Open an embedded directory, panicking on failure
#[macro_export]
macro_rules! must_dir {
    ($resolver:expr, $path:literal $(,)?) => {
        $crate::Resolver::must_dir(&$resolver, &$crate::call_site!(), $path)
    };
}

/// Open an embedded file, returning `Result<File, EmbedError>`
#[macro_export]
macro_rules! new_file {
    ($resolver:expr, $path:literal $(,)?) => {
        $crate::Resolver::new_file(&$resolver, &$crate::call_site!(), $path)
    };
}

/// Open an embedded file, panicking on failure
#[macro_export]
macro_rules! must_file {
    ($resolver:expr, $path:literal $(,)?) => {
        $crate::Resolver::must_file(&$resolver, &$crate::call_site!(), $path)
    };
}
