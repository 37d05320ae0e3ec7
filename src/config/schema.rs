//! Static schema descriptors for configuration documents.
//!
//! Each document type declares a table of [`SchemaField`]s in field order.
//! The table carries nesting and the documentation that the comment
//! annotator writes into the file; it is a plain `const`, so it is built
//! once and needs no runtime introspection.

use heck::ToKebabCase;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Metadata for one field of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    /// Rust field name (snake_case).
    pub name: &'static str,
    /// Fields of the nested document, if the value is itself a document.
    pub nested: Option<&'static [SchemaField]>,
    /// Comment text written above the field. May span several lines.
    pub doc: Option<&'static str>,
    /// Blank lines emitted before the field (and its comment).
    pub spacing: usize,
}

impl SchemaField {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            nested: None,
            doc: None,
            spacing: 0,
        }
    }

    pub const fn doc(mut self, text: &'static str) -> Self {
        self.doc = Some(text);
        self
    }

    pub const fn spacing(mut self, lines: usize) -> Self {
        self.spacing = lines;
        self
    }

    pub const fn nested(mut self, fields: &'static [SchemaField]) -> Self {
        self.nested = Some(fields);
        self
    }

    /// Serialized key as it appears in the file.
    pub fn key(&self) -> String {
        self.name.to_kebab_case()
    }

    /// Find the field whose serialized key is `key`.
    pub fn find<'a>(fields: &'a [SchemaField], key: &str) -> Option<&'a SchemaField> {
        fields.iter().find(|field| field.key() == key)
    }
}

/// A typed configuration document with a static schema table.
///
/// Implementors serialize with kebab-case keys
/// (`#[serde(rename_all = "kebab-case")]`) so that the serialized form
/// matches [`SchemaField::key`].
pub trait ConfigSchema: Serialize + DeserializeOwned {
    /// Fields in serialization order.
    const FIELDS: &'static [SchemaField];
}

/// Schema descriptor of `T`.
pub fn describe<T: ConfigSchema>() -> &'static [SchemaField] {
    T::FIELDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Inner {
        max_players: u32,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Outer {
        server_name: String,
        inner: Inner,
    }

    impl ConfigSchema for Inner {
        const FIELDS: &'static [SchemaField] =
            &[SchemaField::new("max_players").doc("Player cap.")];
    }

    impl ConfigSchema for Outer {
        const FIELDS: &'static [SchemaField] = &[
            SchemaField::new("server_name"),
            SchemaField::new("inner").nested(Inner::FIELDS).spacing(1),
        ];
    }

    #[test]
    fn test_key_is_kebab_case() {
        assert_eq!(SchemaField::new("no_permission").key(), "no-permission");
        assert_eq!(SchemaField::new("prefix").key(), "prefix");
    }

    #[test]
    fn test_describe_returns_static_table() {
        let fields = describe::<Outer>();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].spacing, 1);
        assert_eq!(fields[1].nested, Some(Inner::FIELDS));
        assert!(fields[0].doc.is_none());
    }

    #[test]
    fn test_find_by_serialized_key() {
        let field = SchemaField::find(Outer::FIELDS, "server-name").unwrap();
        assert_eq!(field.name, "server_name");
        assert!(SchemaField::find(Outer::FIELDS, "server_name").is_none());
    }
}
