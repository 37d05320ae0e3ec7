//! Conversion between typed documents, untyped trees, and YAML text.
//!
//! Strict decoding rejects anything the schema does not describe. Lenient
//! decoding only cares about syntax and is what the merge fallback runs on.

use super::schema::{ConfigSchema, SchemaField};
use crate::error::{ConfigResult, DecodeError, DecodeErrorKind};

/// Untyped YAML tree used as the intermediate form during merges.
pub type Tree = serde_yaml::Value;

/// Interpret raw file bytes as text. Invalid UTF-8 is a syntax error.
pub fn decode_bytes(bytes: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes).map_err(|e| {
        DecodeError::syntax(format!(
            "file is not valid UTF-8 (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })
}

/// Parse `text` into an untyped tree. Unknown and missing keys are fine;
/// only malformed YAML fails. An empty document yields `null`.
pub fn decode_tree(text: &str) -> Result<Tree, DecodeError> {
    if text.trim().is_empty() {
        return Ok(Tree::Null);
    }
    serde_yaml::from_str(text).map_err(|e| DecodeError::from_yaml(DecodeErrorKind::Syntax, &e))
}

/// Parse `text` against the exact schema of `T`.
///
/// Fails on malformed YAML, on keys the schema does not declare, and on
/// missing fields or type mismatches.
pub fn decode_strict<T: ConfigSchema>(text: &str) -> Result<T, DecodeError> {
    let tree = decode_tree(text)?;
    check_known_keys(&tree, T::FIELDS, "")?;
    decode_tree_to_document(tree)
}

/// Decode a (merged) tree into `T`. Extension keys are ignored.
pub fn decode_tree_to_document<T: ConfigSchema>(tree: Tree) -> Result<T, DecodeError> {
    serde_yaml::from_value(tree)
        .map_err(|e| DecodeError::from_yaml(DecodeErrorKind::SchemaMismatch, &e))
}

/// Serialize a document. Keys follow the schema field order.
pub fn encode_document<T: ConfigSchema>(document: &T) -> ConfigResult<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Serialize an untyped tree, keeping its key order.
pub fn encode_tree(tree: &Tree) -> ConfigResult<String> {
    Ok(serde_yaml::to_string(tree)?)
}

/// Convert a document into its untyped tree.
pub fn document_to_tree<T: ConfigSchema>(document: &T) -> ConfigResult<Tree> {
    Ok(serde_yaml::to_value(document)?)
}

/// Reject mapping keys that are not declared in `fields`, descending into
/// nested documents.
fn check_known_keys(tree: &Tree, fields: &[SchemaField], prefix: &str) -> Result<(), DecodeError> {
    // Non-mapping values are left for the typed decode to reject
    let Tree::Mapping(map) = tree else {
        return Ok(());
    };
    for (key, value) in map {
        let name = match key.as_str() {
            Some(name) => name,
            None => {
                return Err(DecodeError::schema_mismatch(format!(
                    "non-string key {:?}{}",
                    key,
                    if prefix.is_empty() {
                        String::new()
                    } else {
                        format!(" under `{}`", prefix)
                    }
                )));
            }
        };
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        };
        let Some(field) = SchemaField::find(fields, name) else {
            return Err(DecodeError::unknown_key(&path));
        };
        if let Some(nested) = field.nested {
            check_known_keys(value, nested, &path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Limits {
        max_players: u32,
        whitelist: Vec<String>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Settings {
        server_name: String,
        enabled: bool,
        limits: Limits,
    }

    impl ConfigSchema for Limits {
        const FIELDS: &'static [SchemaField] = &[
            SchemaField::new("max_players"),
            SchemaField::new("whitelist"),
        ];
    }

    impl ConfigSchema for Settings {
        const FIELDS: &'static [SchemaField] = &[
            SchemaField::new("server_name"),
            SchemaField::new("enabled"),
            SchemaField::new("limits").nested(Limits::FIELDS),
        ];
    }

    fn sample() -> Settings {
        Settings {
            server_name: "lobby: main".to_string(),
            enabled: true,
            limits: Limits {
                max_players: 20,
                whitelist: vec!["alice".to_string(), "bob".to_string()],
            },
        }
    }

    #[test]
    fn test_encode_uses_kebab_keys_in_field_order() {
        let text = encode_document(&sample()).unwrap();
        let server = text.find("server-name:").unwrap();
        let enabled = text.find("enabled:").unwrap();
        let limits = text.find("limits:").unwrap();
        assert!(server < enabled && enabled < limits);
        assert!(text.contains("  max-players: 20"));
    }

    #[test]
    fn test_strict_round_trip() {
        let doc = sample();
        let text = encode_document(&doc).unwrap();
        let decoded: Settings = decode_strict(&text).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_strict_rejects_unknown_top_level_key() {
        let text = format!("{}debug-mode: true\n", encode_document(&sample()).unwrap());
        let err = decode_strict::<Settings>(&text).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::SchemaMismatch);
        assert_eq!(err.location, Some(Location::Key("debug-mode".to_string())));
    }

    #[test]
    fn test_strict_rejects_unknown_nested_key() {
        let text = "server-name: x\nenabled: true\nlimits:\n  max-players: 1\n  whitelist: []\n  colour: red\n";
        let err = decode_strict::<Settings>(text).unwrap_err();
        assert_eq!(err.location, Some(Location::Key("limits.colour".to_string())));
    }

    #[test]
    fn test_strict_rejects_missing_field_and_type_mismatch() {
        let missing = "server-name: x\nlimits:\n  max-players: 1\n  whitelist: []\n";
        let err = decode_strict::<Settings>(missing).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::SchemaMismatch);
        assert!(err.reason.contains("enabled"), "{}", err.reason);

        let mismatch = "server-name: x\nenabled: maybe\nlimits:\n  max-players: 1\n  whitelist: []\n";
        let err = decode_strict::<Settings>(mismatch).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_syntax_error_is_reported_as_syntax() {
        let err = decode_strict::<Settings>("server-name: [unclosed\nenabled: true\n").unwrap_err();
        assert!(err.is_syntax());
        let err = decode_tree("limits:\n  whitelist: 'unterminated\n").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_lenient_decode_accepts_partial_documents() {
        let tree = decode_tree("server-name: x\nunknown: 1\n").unwrap();
        assert_eq!(tree["unknown"], Tree::from(1));
        assert!(tree.get("enabled").is_none());

        assert_eq!(decode_tree("").unwrap(), Tree::Null);
    }

    #[test]
    fn test_tree_to_document_ignores_extension_keys() {
        let mut tree = document_to_tree(&sample()).unwrap();
        tree.as_mapping_mut()
            .unwrap()
            .insert(Tree::from("debug-mode"), Tree::from(true));
        let doc: Settings = decode_tree_to_document(tree.clone()).unwrap();
        assert_eq!(doc, sample());

        let text = encode_tree(&tree).unwrap();
        assert!(text.ends_with("debug-mode: true\n"));
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = decode_bytes(&[b'a', b':', b' ', 0xff, 0xfe]).unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(decode_bytes(b"a: 1").unwrap(), "a: 1");
    }
}
