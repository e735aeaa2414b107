//! Property-based tests for snapshot fidelity

use embedfs::codec;
use embedfs::tree::builder::Packer;
use embedfs::tree::node::Node;
use embedfs::{Dir, File, TreeIndex};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Relative file paths (one or two levels deep) to contents
fn file_tree() -> impl Strategy<Value = BTreeMap<Vec<String>, Vec<u8>>> {
    let segment = "[a-z]{1,6}";
    let path = prop::collection::vec(segment, 1..3);
    prop::collection::btree_map(path, any::<Vec<u8>>(), 1..8)
}

/// Drop entries that would need a path to be both a file and a directory
fn consistent(tree: BTreeMap<Vec<String>, Vec<u8>>) -> BTreeMap<Vec<String>, Vec<u8>> {
    let mut kept: BTreeMap<Vec<String>, Vec<u8>> = BTreeMap::new();
    for (path, content) in tree {
        let clashes = kept
            .keys()
            .any(|other| other.starts_with(&path) || path.starts_with(other));
        if !clashes {
            kept.insert(path, content);
        }
    }
    kept
}

fn write_tree(root: &Path, tree: &BTreeMap<Vec<String>, Vec<u8>>) {
    for (path, content) in tree {
        let file = path.iter().fold(root.to_path_buf(), |p, s| p.join(s));
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }
}

/// Packing, encoding and decoding a tree keeps every file's bytes
#[test]
fn test_pack_encode_decode_preserves_files() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(32));

    runner
        .run(&file_tree(), |tree| {
            let tree = consistent(tree);
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path().join("root");
            fs::create_dir(&root).unwrap();
            write_tree(&root, &tree);

            let node = Packer::new().pack_dir(&root).unwrap();
            let mut index = TreeIndex::new();
            index.insert("prop/prop.rs|root", node);

            let decoded = codec::decode(&codec::encode(&index).unwrap()).unwrap();
            prop_assert_eq!(&decoded, &index);

            let root_node = decoded.get("prop/prop.rs|root").unwrap();
            for (path, content) in &tree {
                let found = Node::walk(root_node, path).unwrap();
                prop_assert_eq!(found.content().unwrap(), content.as_slice());
                prop_assert_eq!(found.metadata().size, content.len() as u64);
            }
            Ok(())
        })
        .unwrap();
}

/// Packing the same directory twice yields equal trees
#[test]
fn test_packing_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(16));

    runner
        .run(&file_tree(), |tree| {
            let tree = consistent(tree);
            let temp_dir = TempDir::new().unwrap();
            write_tree(temp_dir.path(), &tree);

            let packer = Packer::new();
            let first = packer.pack_dir(temp_dir.path()).unwrap();
            let second = packer.pack_dir(temp_dir.path()).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// Anything added is listed by its parent and readable back
    #[test]
    fn test_add_then_read(path in prop::collection::vec("[a-z]{1,5}", 1..5), content in any::<Vec<u8>>()) {
        let mut dir = Dir::empty("root");
        let joined = path.join("/");
        let name = path.last().unwrap().clone();
        dir.add(&joined, File::from_bytes(name.clone(), content.clone())).unwrap();

        let parent = &path[..path.len() - 1];
        let listing = dir.read(parent).unwrap();
        prop_assert_eq!(listing.len(), 1);
        prop_assert_eq!(&listing[0].name, &name);
        prop_assert_eq!(dir.file(&path).contents().unwrap(), content);
    }

    /// Grafting never changes a tree someone else still holds
    #[test]
    fn test_graft_is_copy_on_write(path in prop::collection::vec("[a-z]{1,5}", 1..4)) {
        let original = Arc::new(Node::empty_dir("root"));
        let mut copy = Arc::clone(&original);
        Node::graft(&mut copy, &path, Node::from_bytes("x", "x")).unwrap();

        prop_assert_eq!(original.node_count(), 1);
        prop_assert_eq!(copy.node_count(), path.len() + 1);
    }
}
