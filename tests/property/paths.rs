//! Property-based tests for path normalization

use embedfs::tree::path::{join_segments, split_path};
use proptest::prelude::*;

fn raw_path() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof!["[a-z]{1,4}", Just(".".to_string()), Just("..".to_string()), Just(String::new())],
        0..8,
    )
    .prop_flat_map(|parts| {
        let sep = prop_oneof![Just("/"), Just("\\")];
        (Just(parts), sep)
    })
    .prop_map(|(parts, sep)| parts.join(sep))
}

proptest! {
    #[test]
    fn test_leading_separator_is_irrelevant(path in raw_path()) {
        prop_assert_eq!(split_path(&format!("/{}", path)), split_path(&path));
        prop_assert_eq!(split_path(&format!("  {} ", path)), split_path(&path));
    }

    #[test]
    fn test_segments_are_clean(path in raw_path()) {
        for segment in split_path(&path) {
            prop_assert!(!segment.is_empty());
            prop_assert!(segment != "." && segment != "..");
            prop_assert!(!segment.contains('/') && !segment.contains('\\'));
        }
    }

    #[test]
    fn test_normalization_is_idempotent(path in raw_path()) {
        let once = split_path(&path);
        prop_assert_eq!(split_path(&join_segments(&once)), once);
    }

    #[test]
    fn test_parent_segments_never_escape(depth in 0usize..6, name in "[a-z]{1,4}") {
        let path = format!("{}{}", "../".repeat(depth), name);
        prop_assert_eq!(split_path(&path), vec![name]);
    }
}
