//! Tree merge for reconciling an on-disk document with the defaults.
//!
//! File values win, default structure wins: every key of the default tree
//! survives, values the operator wrote are kept, and keys the schema does
//! not know about are carried along instead of being dropped.
//! Sequences are taken from the file whole, never merged element-wise.

use super::codec::Tree;
use serde_yaml::Mapping;

/// Merge `file` over `default`.
///
/// - Mappings merge recursively. Output order is the default's key order,
///   followed by file-only keys in file order.
/// - Only a missing key takes the default. A present node, `null` included,
///   is kept as written, as are sequences, scalars and mismatched kinds.
///
/// # Example
/// ```
/// use enderalib::config::merge;
///
/// let file = serde_yaml::from_str("messages:\n  prefix: '[Mine]'\ndebug-mode: true\n").unwrap();
/// let default = serde_yaml::from_str("messages:\n  prefix: '[Lib]'\n  no-permission: denied\n").unwrap();
/// let merged = merge(file, default);
/// assert_eq!(
///     merged,
///     serde_yaml::from_str::<serde_yaml::Value>(
///         "messages:\n  prefix: '[Mine]'\n  no-permission: denied\ndebug-mode: true\n"
///     )
///     .unwrap()
/// );
/// ```
pub fn merge(file: Tree, default: Tree) -> Tree {
    match (file, default) {
        // Both are mappings: merge key by key
        (Tree::Mapping(mut file_map), Tree::Mapping(default_map)) => {
            let mut merged = Mapping::with_capacity(default_map.len() + file_map.len());
            for (key, default_value) in default_map {
                let value = match file_map.shift_remove(&key) {
                    Some(file_value) => merge(file_value, default_value),
                    None => default_value,
                };
                merged.insert(key, value);
            }
            // Extension keys, in their original order
            for (key, file_value) in file_map {
                merged.insert(key, file_value);
            }
            Tree::Mapping(merged)
        }
        // Any other case: the file node is kept as written
        (file, _) => file,
    }
}

/// Dotted paths of keys present in `file` but not declared in `default`.
///
/// Only the outermost unknown key of an unknown subtree is reported.
pub fn extension_keys(file: &Tree, default: &Tree) -> Vec<String> {
    fn walk(file: &Tree, default: &Tree, prefix: &str, out: &mut Vec<String>) {
        let (Tree::Mapping(file_map), Tree::Mapping(default_map)) = (file, default) else {
            return;
        };
        for (key, file_value) in file_map {
            let name = match key {
                Tree::String(s) => s.clone(),
                other => serde_yaml::to_string(other)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_default(),
            };
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{}.{}", prefix, name)
            };
            match default_map.get(key) {
                Some(default_value) => walk(file_value, default_value, &path, out),
                None => out.push(path),
            }
        }
    }

    let mut out = Vec::new();
    walk(file, default, "", &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Tree {
        serde_yaml::from_str(text).unwrap()
    }

    fn keys(tree: &Tree) -> Vec<String> {
        tree.as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_file_scalar_wins() {
        let result = merge(yaml("a: 1\nb: 2"), yaml("a: 10\nb: 20"));
        assert_eq!(result, yaml("a: 1\nb: 2"));
    }

    #[test]
    fn test_missing_keys_filled_from_default() {
        let result = merge(
            yaml("messages:\n  prefix: mine"),
            yaml("messages:\n  prefix: lib\n  no-permission: denied"),
        );
        assert_eq!(
            result,
            yaml("messages:\n  prefix: mine\n  no-permission: denied")
        );
    }

    #[test]
    fn test_default_key_order_then_extensions() {
        let result = merge(
            yaml("zeta: 1\nextra-one: x\nalpha: 2\nextra-two: y"),
            yaml("alpha: 0\nbeta: 0\nzeta: 0"),
        );
        assert_eq!(keys(&result), vec!["alpha", "beta", "zeta", "extra-one", "extra-two"]);
        assert_eq!(result["alpha"], yaml("2"));
        assert_eq!(result["zeta"], yaml("1"));
    }

    #[test]
    fn test_extension_subtree_kept_verbatim() {
        let result = merge(
            yaml("a: 1\ncustom:\n  nested: [1, 2]"),
            yaml("a: 0"),
        );
        assert_eq!(result, yaml("a: 1\ncustom:\n  nested: [1, 2]"));
    }

    #[test]
    fn test_sequences_replaced_not_merged() {
        let result = merge(yaml("items: [4, 5]"), yaml("items: [1, 2, 3]"));
        assert_eq!(result, yaml("items: [4, 5]"));

        let result = merge(yaml("items: []"), yaml("items: [1]"));
        assert_eq!(result, yaml("items: []"));
    }

    #[test]
    fn test_present_null_is_kept() {
        let result = merge(yaml("a:\nb: 1"), yaml("a: 5\nb: 0"));
        assert_eq!(result, yaml("a: null\nb: 1"));

        let result = merge(yaml("a: ~"), yaml("a:\n  b: 1"));
        assert_eq!(result, yaml("a: null"));
    }

    #[test]
    fn test_missing_key_takes_default_even_when_null() {
        let result = merge(yaml("b: 1"), yaml("a: ~\nb: 0"));
        assert_eq!(result, yaml("a: null\nb: 1"));
    }

    #[test]
    fn test_kind_change_keeps_file_node() {
        // Default grew a mapping where the file still has a scalar
        let result = merge(
            yaml("messages: old-style"),
            yaml("messages:\n  prefix: lib"),
        );
        assert_eq!(result, yaml("messages: old-style"));

        // And the reverse
        let result = merge(yaml("limit:\n  max: 3"), yaml("limit: 10"));
        assert_eq!(result, yaml("limit:\n  max: 3"));
    }

    #[test]
    fn test_key_match_is_case_sensitive() {
        let result = merge(yaml("Prefix: mine"), yaml("prefix: lib"));
        assert_eq!(keys(&result), vec!["prefix", "Prefix"]);
        assert_eq!(result["prefix"], yaml("lib"));
    }

    #[test]
    fn test_deep_nested_merge() {
        let result = merge(
            yaml("l1:\n  l2:\n    l3:\n      b: 3\n      c: 4"),
            yaml("l1:\n  l2:\n    l3:\n      a: 1\n      b: 2"),
        );
        assert_eq!(
            result,
            yaml("l1:\n  l2:\n    l3:\n      a: 1\n      b: 3\n      c: 4")
        );
    }

    #[test]
    fn test_merge_contains_every_default_key() {
        let default = yaml("a: 1\nb:\n  c: 2\n  d: [1]\ne: x");
        let files = [
            yaml("{}"),
            yaml("b: 7"),
            yaml("b:\n  c: 9\nz: 1"),
            yaml("a: [1, 2]\ne:\n  f: 1"),
            yaml("a: ~\nb: ~"),
        ];
        for file in files {
            let merged = merge(file, default.clone());
            for key in ["a", "b", "e"] {
                assert!(merged.get(key).is_some(), "missing {key} in {merged:?}");
            }
        }
    }

    #[test]
    fn test_extension_keys() {
        let file = yaml("a: 1\ndebug-mode: true\nb:\n  c: 1\n  colour: red");
        let default = yaml("a: 0\nb:\n  c: 0");
        assert_eq!(extension_keys(&file, &default), vec!["debug-mode", "b.colour"]);
        assert!(extension_keys(&default, &default).is_empty());
    }
}
