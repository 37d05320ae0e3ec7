//! Structured error types for the configuration lifecycle.
//!
//! Decode errors are recoverable: the load pipeline answers them with the
//! merge/regenerate fallback chain. [`ConfigError`] is the fatal kind that is
//! surfaced to the host.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Category of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Text is not well-formed YAML (or not UTF-8 at all).
    Syntax,
    /// Well-formed YAML that does not fit the typed schema.
    SchemaMismatch,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Syntax => write!(f, "syntax error"),
            DecodeErrorKind::SchemaMismatch => write!(f, "schema mismatch"),
        }
    }
}

/// Where in the document a decode error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Position in the source text (1-based).
    Text { line: usize, column: usize },
    /// Dotted path of serialized keys, e.g. `messages.no-permission`.
    Key(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Text { line, column } => write!(f, "line {} column {}", line, column),
            Location::Key(path) => write!(f, "key `{}`", path),
        }
    }
}

/// Failure to turn text or a tree into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub reason: String,
    pub location: Option<Location>,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    // Convenience constructors

    pub fn syntax(reason: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::Syntax, reason)
    }

    pub fn schema_mismatch(reason: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::SchemaMismatch, reason)
    }

    pub fn unknown_key(path: &str) -> Self {
        Self::schema_mismatch(format!("unknown field `{}`", path))
            .with_location(Location::Key(path.to_string()))
    }

    /// Wrap a serde_yaml error, keeping its text position when it has one.
    pub fn from_yaml(kind: DecodeErrorKind, err: &serde_yaml::Error) -> Self {
        let error = Self::new(kind, err.to_string());
        match err.location() {
            Some(loc) => error.with_location(Location::Text {
                line: loc.line(),
                column: loc.column(),
            }),
            None => error,
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == DecodeErrorKind::Syntax
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(ref location) => write!(f, "{} at {}: {}", self.kind, location, self.reason),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Pipeline stage at which a fatal error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateDirectory,
    Read,
    Write,
    Rename,
    SelfCheck,
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::CreateDirectory => write!(f, "create-directory"),
            Stage::Read => write!(f, "read"),
            Stage::Write => write!(f, "write"),
            Stage::Rename => write!(f, "rename"),
            Stage::SelfCheck => write!(f, "self-check"),
            Stage::Encode => write!(f, "encode"),
        }
    }
}

/// Fatal configuration failure. The host is expected to abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to create data directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document the pipeline just wrote does not decode. Indicates a codec
    /// or schema table defect, not bad operator input.
    #[error("freshly written configuration {} does not decode: {source}", path.display())]
    SelfWrite {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Stage of the pipeline that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ConfigError::DirectoryCreate { .. } => Stage::CreateDirectory,
            ConfigError::Read { .. } => Stage::Read,
            ConfigError::Write { .. } => Stage::Write,
            ConfigError::Rename { .. } => Stage::Rename,
            ConfigError::SelfWrite { .. } => Stage::SelfCheck,
            ConfigError::Encode(_) => Stage::Encode,
        }
    }
}

/// Result type for pipeline operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display_with_location() {
        let err = DecodeError::unknown_key("messages.colour");
        assert_eq!(err.kind, DecodeErrorKind::SchemaMismatch);
        assert_eq!(
            err.to_string(),
            "schema mismatch at key `messages.colour`: unknown field `messages.colour`"
        );
    }

    #[test]
    fn test_decode_error_from_yaml_keeps_position() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2").unwrap_err();
        let err = DecodeError::from_yaml(DecodeErrorKind::Syntax, &yaml_err);
        assert!(err.is_syntax());
        assert!(matches!(err.location, Some(Location::Text { .. })));
    }

    #[test]
    fn test_config_error_stage() {
        let err = ConfigError::Read {
            path: PathBuf::from("config.yml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.stage(), Stage::Read);
        assert!(err.to_string().starts_with("failed to read configuration config.yml"));

        let err = ConfigError::SelfWrite {
            path: PathBuf::from("config.yml"),
            source: DecodeError::syntax("bad"),
        };
        assert_eq!(err.stage(), Stage::SelfCheck);
    }
}
