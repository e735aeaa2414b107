//! Compilation-unit resolution: which module does a source file define?
//!
//! The generator and the runtime only agree on call-site identifiers if this
//! mapping matches what `module_path!()` reports for the same file. The
//! default [`CargoUnits`] follows Cargo's target layout; projects with
//! `#[path]` attributes or unusual test layouts can plug in their own
//! [`UnitResolver`].

use crate::error::{EmbedError, Result};
use crate::tree::path::canonicalize_path;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Maps a source file to the module path it defines
pub trait UnitResolver {
    fn module_path(&self, source: &Path) -> Result<String>;
}

impl<F> UnitResolver for F
where
    F: Fn(&Path) -> Result<String>,
{
    fn module_path(&self, source: &Path) -> Result<String> {
        self(source)
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<Package>,
    lib: Option<Target>,
    #[serde(default)]
    bin: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Target {
    name: Option<String>,
    path: Option<PathBuf>,
}

/// Target layout of one Cargo package
#[derive(Debug, Clone)]
pub struct CrateLayout {
    root: PathBuf,
    package_name: String,
    lib_name: Option<String>,
    lib_root: PathBuf,
    /// Crate root files declared with an explicit `path`, relative to `root`
    explicit_roots: HashMap<PathBuf, String>,
}

impl CrateLayout {
    /// Read `Cargo.toml` in `manifest_dir`
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self> {
        let root = canonicalize_path(manifest_dir)?;
        let text = std::fs::read_to_string(root.join("Cargo.toml"))?;
        let manifest: Manifest = toml::from_str(&text).map_err(|e| {
            EmbedError::Config(format!("Invalid Cargo.toml in {}: {}", root.display(), e))
        })?;
        let package = manifest.package.ok_or_else(|| {
            EmbedError::Config(format!("{} has no [package] section", root.display()))
        })?;

        let package_name = crate_name(&package.name);
        let mut explicit_roots = HashMap::new();

        let lib_root = manifest
            .lib
            .as_ref()
            .and_then(|l| l.path.clone())
            .unwrap_or_else(|| PathBuf::from("src/lib.rs"));
        let lib_name = match &manifest.lib {
            Some(lib) => Some(lib.name.as_deref().map(crate_name).unwrap_or_else(|| package_name.clone())),
            None if root.join("src/lib.rs").is_file() => Some(package_name.clone()),
            None => None,
        };

        for bin in &manifest.bin {
            if let (Some(name), Some(path)) = (&bin.name, &bin.path) {
                explicit_roots.insert(clean(path), crate_name(name));
            }
        }

        Ok(Self {
            root,
            package_name,
            lib_name,
            lib_root: clean(&lib_root),
            explicit_roots,
        })
    }

    /// Find the nearest enclosing package of `source`
    pub fn discover(source: &Path) -> Result<Self> {
        let source = canonicalize_path(source)?;
        for dir in source.ancestors().skip(1) {
            let manifest = dir.join("Cargo.toml");
            if manifest.is_file() {
                let text = std::fs::read_to_string(&manifest)?;
                if text.contains("[package]") {
                    return Self::from_manifest_dir(dir);
                }
            }
        }
        Err(EmbedError::Config(format!(
            "No Cargo package encloses {}",
            source.display()
        )))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module path for a source file inside this package
    pub fn module_path_of(&self, source: &Path) -> Result<String> {
        let source = canonicalize_path(source)?;
        let rel = source.strip_prefix(&self.root).map_err(|_| {
            EmbedError::Config(format!(
                "{} is outside package {}",
                source.display(),
                self.root.display()
            ))
        })?;
        let rel = clean(rel);

        let unit = self.crate_of(&rel)?;
        let mut path = vec![unit.name];
        if rel != unit.root_file {
            let inner = rel.strip_prefix(&unit.module_dir).unwrap_or(&rel);
            path.extend(module_segments(inner));
        }
        let module_path = path.join("::");
        debug!(source = %rel.display(), module_path = %module_path, "Resolved compilation unit");
        Ok(module_path)
    }

    /// The crate `rel` belongs to
    fn crate_of(&self, rel: &Path) -> Result<Unit> {
        if let Some(name) = self.explicit_roots.get(rel) {
            return Ok(Unit::rooted_at(name.clone(), rel));
        }

        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();

        match parts.as_slice() {
            ["src", "main.rs"] => Ok(Unit::rooted_at(self.package_name.clone(), rel)),
            ["src", "bin", file] if file.ends_with(".rs") => {
                Ok(Unit::rooted_at(crate_name(stem(file)), rel))
            }
            ["src", "bin", dir, ..] => {
                let module_dir = PathBuf::from("src/bin").join(dir);
                Ok(Unit {
                    name: crate_name(dir),
                    root_file: module_dir.join("main.rs"),
                    module_dir,
                })
            }
            [kind, file] if is_auxiliary(kind) && file.ends_with(".rs") => {
                Ok(Unit::rooted_at(crate_name(stem(file)), rel))
            }
            [kind, dir, ..] if is_auxiliary(kind) => {
                let module_dir = PathBuf::from(kind).join(dir);
                Ok(Unit {
                    name: crate_name(dir),
                    root_file: module_dir.join("main.rs"),
                    module_dir,
                })
            }
            _ => {
                let lib_dir = parent_of(&self.lib_root);
                match &self.lib_name {
                    Some(name) if rel.starts_with(&lib_dir) => {
                        Ok(Unit::rooted_at(name.clone(), &self.lib_root))
                    }
                    _ if rel.starts_with("src") => Ok(Unit::rooted_at(
                        self.package_name.clone(),
                        Path::new("src/main.rs"),
                    )),
                    _ => Err(EmbedError::Config(format!(
                        "Cannot tell which crate {} belongs to",
                        rel.display()
                    ))),
                }
            }
        }
    }
}

/// One compilation unit of a package
struct Unit {
    name: String,
    /// Crate root source file, relative to the package root
    root_file: PathBuf,
    /// Directory the crate's module tree hangs off
    module_dir: PathBuf,
}

impl Unit {
    fn rooted_at(name: String, root_file: &Path) -> Self {
        Self {
            name,
            root_file: root_file.to_path_buf(),
            module_dir: parent_of(root_file),
        }
    }
}

/// Module segments for a non-root file, relative to its crate's module dir
fn module_segments(inner: &Path) -> Vec<String> {
    let mut segments: Vec<String> = inner
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = segments.pop() {
        let last_stem = stem(&last);
        if last_stem != "mod" {
            segments.push(last_stem.to_string());
        }
    }
    segments
}

fn is_auxiliary(kind: &str) -> bool {
    matches!(kind, "tests" | "benches" | "examples")
}

fn stem(file: &str) -> &str {
    file.strip_suffix(".rs").unwrap_or(file)
}

/// Crate names normalize `-` to `_`, as `module_path!()` reports them
fn crate_name(name: &str) -> String {
    name.replace('-', "_")
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn clean(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Default resolver: Cargo layout, one fixed package or discovered per file
#[derive(Debug, Clone, Default)]
pub struct CargoUnits {
    layout: Option<CrateLayout>,
}

impl CargoUnits {
    /// Discover the enclosing package of each scanned file
    pub fn discover() -> Self {
        Self { layout: None }
    }

    /// Resolve every file against the package in `manifest_dir`
    pub fn for_manifest_dir(manifest_dir: &Path) -> Result<Self> {
        Ok(Self {
            layout: Some(CrateLayout::from_manifest_dir(manifest_dir)?),
        })
    }
}

impl UnitResolver for CargoUnits {
    fn module_path(&self, source: &Path) -> Result<String> {
        match &self.layout {
            Some(layout) => layout.module_path_of(source),
            None => CrateLayout::discover(source)?.module_path_of(source),
        }
    }
}
