//! Configuration lifecycle.
//!
//! Loads a YAML configuration document, validates it strictly, repairs it
//! against the compiled-in defaults when it drifts, and writes it back with
//! documentation comments taken from the schema.
//!
//! ## Pieces
//! - [`schema`] - static field tables (keys, nesting, comments, spacing)
//! - [`codec`] - strict and lenient YAML decoding, encoding
//! - [`merge`] - file-values-win, default-structure-wins tree merge
//! - [`comments`] - inserts comments and spacing into serialized text
//! - [`loader`] - the load/repair/regenerate pipeline
//! - [`registry`] - type-keyed registry and reloadable handles
//!
//! ## Files next to the configuration
//! - `<name>-backup.<ext>` - copy of the file before a merge repair
//! - `<name>_invalid_<yyyy-MM-dd_HH-mm-ss>.<ext>` - unrecoverable file, moved aside

pub mod codec;
pub mod comments;
pub mod files;
pub mod loader;
pub mod merge;
pub mod registry;
pub mod schema;
mod types;

pub use codec::{
    Tree, decode_strict, decode_tree, decode_tree_to_document, document_to_tree, encode_document,
    encode_tree,
};
pub use comments::annotate;
pub use files::{backup_path, invalid_path};
pub use loader::{ConfigManager, LoadOutcome, Loaded, load_or_create};
pub use merge::{extension_keys, merge};
pub use registry::{ConfigHandle, ConfigRegistry, ManagedConfig, load_all};
pub use schema::{ConfigSchema, SchemaField, describe};
pub use types::*;
