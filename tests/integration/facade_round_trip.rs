//! Integration tests for pack, encode, decode and the filesystem facade

use super::test_utils::{key_for, site_fixture};
use embedfs::codec;
use embedfs::tree::builder::Packer;
use embedfs::{CallSite, Dir, ErrorKind, File, Resolver, TreeIndex};
use std::io::{Read, Seek, SeekFrom};

const SITE: CallSite = CallSite::new("app::web", "src/web.rs", None);

fn baked_index() -> (tempfile::TempDir, TreeIndex) {
    let temp_dir = site_fixture();
    let node = Packer::new().pack_dir(&temp_dir.path().join("site")).unwrap();
    let mut index = TreeIndex::new();
    index.insert(key_for(&SITE, "site"), node);
    (temp_dir, index)
}

#[test]
fn test_round_trip_streams_exact_bytes() {
    let (_temp_dir, index) = baked_index();
    let decoded = codec::decode(&codec::encode(&index).unwrap()).unwrap();
    assert_eq!(decoded, index);

    let resolver = Resolver::baked(decoded);
    let dir = resolver.new_dir(&SITE, "site").unwrap();
    let mut stream = dir.open("/sub/file.txt").unwrap();
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes, b"hello");

    stream.seek(SeekFrom::Start(1)).unwrap();
    let mut rest = String::new();
    stream.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "ello");
    stream.close().unwrap();
}

#[test]
fn test_round_trip_preserves_metadata() {
    let (temp_dir, index) = baked_index();
    let decoded = codec::decode(&codec::encode(&index).unwrap()).unwrap();
    let dir = Resolver::baked(decoded).must_dir(&SITE, "site");

    let on_disk = std::fs::metadata(temp_dir.path().join("site/sub/file.txt")).unwrap();
    let baked = dir.file(&["sub", "file.txt"]).metadata().unwrap();
    assert_eq!(baked.name, "file.txt");
    assert_eq!(baked.size, 5);
    assert!(!baked.is_dir);
    assert_eq!(baked.modified(), on_disk.modified().unwrap());
}

#[test]
fn test_leading_separator_is_ignored() {
    let (_temp_dir, index) = baked_index();
    let dir = Resolver::baked(index).must_dir(&SITE, "site");

    let with = dir.open("/index.html").unwrap().metadata().unwrap();
    let without = dir.open("index.html").unwrap().metadata().unwrap();
    assert_eq!(with, without);
    assert_eq!(dir.read(&["/sub"]).unwrap(), dir.read(&["sub"]).unwrap());
}

#[test]
fn test_listing_is_sorted_and_typed() {
    let (_temp_dir, index) = baked_index();
    let dir = Resolver::baked(index).must_dir(&SITE, "site");

    let listing = dir.read::<&str>(&[]).unwrap();
    let names: Vec<_> = listing.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["empty", "index.html", "sub"]);
    assert!(listing[0].is_dir);
    assert!(!listing[1].is_dir);

    let stream = dir.open("sub").unwrap();
    assert_eq!(stream.readdir().unwrap().len(), 1);
}

#[test]
fn test_walking_past_leaves_is_not_found() {
    let (_temp_dir, index) = baked_index();
    let dir = Resolver::baked(index).must_dir(&SITE, "site");

    assert!(dir.read(&["empty"]).unwrap().is_empty());
    assert_eq!(dir.open("empty/ghost.txt").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(dir.open("index.html/deeper").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(dir.read(&["index.html"]).unwrap_err().kind(), ErrorKind::WrongType);
}

#[test]
fn test_add_builds_intermediate_directories() {
    let mut dir = Dir::empty("root");
    dir.add("a/b/c.txt", File::from_bytes("c.txt", "see")).unwrap();

    let listing = dir.read(&["a", "b"]).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "c.txt");
    assert!(dir.read(&["a"]).unwrap()[0].is_dir);
    assert_eq!(dir.file(&["a", "b", "c.txt"]).contents().unwrap(), b"see");
}

#[test]
fn test_add_onto_resolved_tree_keeps_index_intact() {
    let (_temp_dir, index) = baked_index();
    let resolver = Resolver::baked(index);
    let mut dir = resolver.must_dir(&SITE, "site");
    dir.add("sub/extra.txt", File::from_bytes("extra.txt", "x")).unwrap();

    assert_eq!(dir.read(&["sub"]).unwrap().len(), 2);
    let fresh = resolver.must_dir(&SITE, "site");
    assert_eq!(fresh.read(&["sub"]).unwrap().len(), 1);
}

#[test]
fn test_graft_into_index_before_resolving() {
    let (_temp_dir, mut index) = baked_index();
    let key = key_for(&SITE, "site");
    index
        .graft(&key, "generated/version.txt", embedfs::Node::from_bytes("version.txt", "1.0"))
        .unwrap();

    let dir = Resolver::baked(index).must_dir(&SITE, "site");
    assert_eq!(dir.file(&["generated", "version.txt"]).contents().unwrap(), b"1.0");
}
