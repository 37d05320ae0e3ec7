//! The library's own configuration document.

use super::schema::{ConfigSchema, SchemaField};
use serde::{Deserialize, Serialize};

/// Default file name inside the data directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Top-level configuration of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LibConfig {
    pub messages: MessagesConfig,
}

impl Default for LibConfig {
    fn default() -> Self {
        Self {
            messages: MessagesConfig::default(),
        }
    }
}

impl ConfigSchema for LibConfig {
    const FIELDS: &'static [SchemaField] = &[SchemaField::new("messages")
        .doc("Messages sent to players. MiniMessage tags are supported.")
        .nested(MessagesConfig::FIELDS)];
}

/// Player-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessagesConfig {
    pub prefix: String,
    pub no_permission: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            prefix: "<gradient:#5e4fa2:#f79459>[EnderaLib]</gradient>".to_string(),
            no_permission: "{prefix} You don't have permission to do this.".to_string(),
        }
    }
}

impl MessagesConfig {
    /// Message text with the `{prefix}` placeholder filled in.
    pub fn render(&self, message: &str) -> String {
        message.replace("{prefix}", &self.prefix)
    }
}

impl ConfigSchema for MessagesConfig {
    const FIELDS: &'static [SchemaField] = &[
        SchemaField::new("prefix").doc("Prepended wherever a message uses {prefix}."),
        SchemaField::new("no_permission")
            .doc("Sent when a command sender lacks the required permission.")
            .spacing(1),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::codec::{decode_strict, encode_document};

    #[test]
    fn test_defaults_round_trip_strictly() {
        let text = encode_document(&LibConfig::default()).unwrap();
        assert!(text.contains("no-permission:"));
        let decoded: LibConfig = decode_strict(&text).unwrap();
        assert_eq!(decoded, LibConfig::default());
    }

    #[test]
    fn test_render_fills_prefix() {
        let messages = MessagesConfig {
            prefix: "[P]".to_string(),
            no_permission: "{prefix} nope".to_string(),
        };
        assert_eq!(messages.render(&messages.no_permission), "[P] nope");
    }
}
