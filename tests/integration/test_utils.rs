//! Shared fixtures for integration tests

use embedfs::tree::index::lookup_key;
use embedfs::{CallSite, TreeIndex};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A small site: `sub/file.txt` holding exactly `hello`, plus an index page
pub fn site_fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("site/sub")).unwrap();
    fs::write(root.join("site/sub/file.txt"), "hello").unwrap();
    fs::write(root.join("site/index.html"), "<h1>home</h1>").unwrap();
    fs::create_dir_all(root.join("site/empty")).unwrap();
    temp_dir
}

/// Minimal Cargo package with the given source files
pub fn package(name: &str, files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("Cargo.toml"),
        format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n", name),
    )
    .unwrap();
    for (path, content) in files {
        write_file(root, path, content);
    }
    temp_dir
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Key the resolver will compute for `site` and `literal`
pub fn key_for(site: &CallSite, literal: &str) -> String {
    lookup_key(&site.identifier().unwrap(), literal)
}

pub fn keys(index: &TreeIndex) -> Vec<String> {
    index.keys().map(str::to_string).collect()
}
