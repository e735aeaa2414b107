//! Fallible and panicking entry points report the same failures

use super::test_utils::{key_for, site_fixture};
use embedfs::tree::builder::Packer;
use embedfs::{CallSite, EmbedError, Resolver, TreeIndex};
use std::panic::{self, AssertUnwindSafe};

const SITE: CallSite = CallSite::new("app", "src/main.rs", None);

fn resolver() -> (tempfile::TempDir, Resolver) {
    let temp_dir = site_fixture();
    let packer = Packer::new();
    let mut index = TreeIndex::new();
    index.insert(
        key_for(&SITE, "site"),
        packer.pack_dir(&temp_dir.path().join("site")).unwrap(),
    );
    index.insert(
        key_for(&SITE, "index.html"),
        packer.pack_file(&temp_dir.path().join("site/index.html")).unwrap(),
    );
    (temp_dir, Resolver::baked(index))
}

fn panic_message<T>(f: impl FnOnce() -> T) -> String {
    let payload = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("expected a panic"),
        Err(payload) => payload,
    };
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default()
}

fn assert_agree(err: EmbedError, message: String) {
    assert!(
        message.contains(&err.to_string()),
        "panic {:?} does not carry {:?}",
        message,
        err.to_string()
    );
}

#[test]
fn test_dir_entry_points_agree() {
    let (_temp_dir, resolver) = resolver();
    for literal in ["missing", "index.html"] {
        let err = resolver.new_dir(&SITE, literal).unwrap_err();
        assert_agree(err, panic_message(|| resolver.must_dir(&SITE, literal)));
    }
}

#[test]
fn test_file_entry_points_agree() {
    let (_temp_dir, resolver) = resolver();
    for literal in ["missing.txt", "site"] {
        let err = resolver.new_file(&SITE, literal).unwrap_err();
        assert_agree(err, panic_message(|| resolver.must_file(&SITE, literal)));
    }
}

#[test]
fn test_caller_info_agrees() {
    let (_temp_dir, resolver) = resolver();
    let nowhere = CallSite::new("", "src/main.rs", None);
    let err = resolver.new_dir(&nowhere, "site").unwrap_err();
    assert_eq!(err.kind(), embedfs::ErrorKind::CallerInfo);
    assert_agree(err, panic_message(|| resolver.must_dir(&nowhere, "site")));
}

#[test]
fn test_contents_agree() {
    let (_temp_dir, resolver) = resolver();
    let dir = resolver.must_dir(&SITE, "site");
    for path in [&["nope.txt"][..], &["sub"][..]] {
        let file = dir.file(path);
        let err = file.contents().unwrap_err();
        assert_agree(err, panic_message(|| file.must_contents()));
    }
}

#[test]
fn test_success_paths_agree() {
    let (_temp_dir, resolver) = resolver();
    let fallible = resolver.new_file(&SITE, "index.html").unwrap().contents().unwrap();
    let panicking = resolver.must_file(&SITE, "index.html").must_contents();
    assert_eq!(fallible, panicking);
}
