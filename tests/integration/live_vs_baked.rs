//! Integration tests contrasting live and baked resolution

use super::test_utils::{key_for, write_file};
use embedfs::tree::builder::Packer;
use embedfs::tree::path::resolve_from;
use embedfs::{CallSite, ErrorKind, Mode, Resolver, TreeIndex};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

/// A project whose `src/main.rs` embeds `src/site`
fn project() -> (TempDir, CallSite) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(root, "src/main.rs", "fn main() {}");
    write_file(root, "src/site/sub/file.txt", "hello");

    let source = root.join("src/main.rs");
    let file: &'static str = Box::leak(source.to_string_lossy().into_owned().into_boxed_str());
    (temp_dir, CallSite::new("app", file, None))
}

/// Pack `literal` the way the generator does: relative to the source file's directory
fn baked_for(site: &CallSite, literal: &str) -> TreeIndex {
    let target = resolve_from(&site.source_dir().unwrap(), literal);
    let mut index = TreeIndex::new();
    index.insert(key_for(site, literal), Packer::new().pack_dir(&target).unwrap());
    index
}

fn read_through(resolver: &Resolver, site: &CallSite, literal: &str) -> String {
    let dir = resolver.new_dir(site, literal).unwrap();
    let mut content = String::new();
    dir.open("sub/file.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[test]
fn test_live_sees_changes_and_baked_does_not() {
    let (temp_dir, site) = project();
    let baked = Resolver::baked(baked_for(&site, "site"));
    let live = Resolver::new(Mode::Live, TreeIndex::new());

    assert_eq!(read_through(&baked, &site, "site"), "hello");
    assert_eq!(read_through(&live, &site, "site"), "hello");

    fs::write(temp_dir.path().join("src/site/sub/file.txt"), "changed").unwrap();

    assert_eq!(read_through(&baked, &site, "site"), "hello");
    assert_eq!(read_through(&live, &site, "site"), "changed");
}

#[test]
fn test_live_file_handles_read_on_access() {
    let (temp_dir, site) = project();
    let live = Resolver::live();
    let file = live.new_file(&site, "site/sub/file.txt").unwrap();
    assert_eq!(file.contents().unwrap(), b"hello");

    fs::write(temp_dir.path().join("src/site/sub/file.txt"), "again").unwrap();
    assert_eq!(file.contents().unwrap(), b"again");
}

#[test]
fn test_both_modes_resolve_parent_segments_alike() {
    let (temp_dir, site) = project();
    write_file(temp_dir.path(), "site/sub/file.txt", "package root");

    // `..` climbs out of the source directory like a plain path join
    let baked = Resolver::baked(baked_for(&site, "../site"));
    let live = Resolver::live();

    assert_eq!(read_through(&baked, &site, "../site"), "package root");
    assert_eq!(read_through(&live, &site, "../site"), "package root");
    assert_eq!(read_through(&live, &site, "site"), "hello");

    let file = live.new_file(&site, "../site/sub/file.txt").unwrap();
    assert_eq!(file.path(), Some(temp_dir.path().join("site/sub/file.txt").as_path()));
}

#[test]
fn test_live_missing_path_is_io_not_found() {
    let (_temp_dir, site) = project();
    let live = Resolver::live();

    // No existence check until the handle is used
    let dir = live.new_dir(&site, "nowhere").unwrap();
    let err = dir.read::<&str>(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.is_not_found());

    let file = live.new_file(&site, "nowhere.txt").unwrap();
    assert!(file.contents().unwrap_err().is_not_found());
    assert!(!Path::new(&site.source_dir().unwrap().join("nowhere.txt")).exists());
}

#[test]
fn test_from_config_selects_backend() {
    let (_temp_dir, site) = project();
    let mut config = embedfs::EmbedConfig::default();
    let index = baked_for(&site, "site");

    let baked = Resolver::from_config(&config, index.clone());
    assert_eq!(baked.mode(), Mode::Baked);
    assert!(baked.new_dir(&site, "other").is_err());

    config.mode = Mode::Live;
    let live = Resolver::from_config(&config, index);
    assert_eq!(live.mode(), Mode::Live);
    assert!(live.new_dir(&site, "other").is_ok());
}
