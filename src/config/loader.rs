//! Configuration load pipeline.
//!
//! Loads a document from disk, repairs it against the defaults when it no
//! longer matches the schema, and always writes the reconciled, commented
//! result back before returning it:
//!
//! 1. **File absent**: write the defaults, read them back strictly.
//! 2. **Strict decode succeeds**: merge with the defaults anyway so that
//!    fields added since the file was written appear in it.
//! 3. **Strict decode fails**: back the file up, decode it leniently and
//!    merge it with the defaults.
//! 4. **Lenient decode or merge fails**: rename the file to a timestamped
//!    `_invalid_` name and start over from step 1.
//!
//! Filesystem failures end the run with a [`ConfigError`]; nothing is retried.

use super::codec::{self, Tree};
use super::comments::annotate;
use super::files;
use super::merge::{extension_keys, merge};
use super::schema::ConfigSchema;
use crate::error::{ConfigError, ConfigResult, DecodeError};
use crate::logging::Logger;
use serde_yaml::Mapping;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which path through the pipeline produced the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file existed; defaults were written.
    Created,
    /// The file decoded strictly and was rewritten with any new fields.
    Loaded,
    /// The file was repaired by merging it with the defaults.
    Repaired {
        /// Copy of the original file, if the backup succeeded.
        backup: Option<PathBuf>,
    },
    /// The file was unrecoverable; it was moved aside and replaced by defaults.
    Regenerated {
        /// Where the original file now lives.
        invalid: PathBuf,
    },
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Created => write!(f, "created"),
            LoadOutcome::Loaded => write!(f, "loaded"),
            LoadOutcome::Repaired { backup: Some(path) } => {
                write!(f, "repaired (backup at {})", path.display())
            }
            LoadOutcome::Repaired { backup: None } => write!(f, "repaired (no backup)"),
            LoadOutcome::Regenerated { invalid } => {
                write!(f, "regenerated (invalid file kept at {})", invalid.display())
            }
        }
    }
}

/// A loaded document together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub config: T,
    pub outcome: LoadOutcome,
}

/// Loads one configuration file of type `T`.
#[derive(Debug, Clone)]
pub struct ConfigManager<T> {
    path: PathBuf,
    data_dir: PathBuf,
    defaults: T,
    logger: Logger,
}

impl<T: ConfigSchema> ConfigManager<T> {
    /// Manager for the file at `path`, creating `data_dir` when needed.
    pub fn new(path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>, defaults: T) -> Self {
        Self {
            path: path.into(),
            data_dir: data_dir.into(),
            defaults,
            logger: Logger::new(),
        }
    }

    /// Manager for `data_dir/file_name`.
    pub fn in_data_dir(data_dir: impl Into<PathBuf>, file_name: &str, defaults: T) -> Self {
        let data_dir = data_dir.into();
        Self::new(data_dir.join(file_name), data_dir, defaults)
    }

    /// Report pipeline progress through `logger`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Path of the managed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory created before the file is first written.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Default document the file is reconciled against.
    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    /// Load or create the file, repairing it when needed, and return the document.
    pub fn load_or_create(&self) -> ConfigResult<T> {
        self.load().map(|loaded| loaded.config)
    }

    /// Like [`load_or_create`](Self::load_or_create), also reporting the outcome.
    pub fn load(&self) -> ConfigResult<Loaded<T>> {
        Pipeline {
            path: &self.path,
            data_dir: &self.data_dir,
            defaults: &self.defaults,
            logger: &self.logger,
        }
        .run()
    }
}

/// Load, repair, or create the configuration at `path`.
pub fn load_or_create<T: ConfigSchema>(
    path: &Path,
    data_dir: &Path,
    defaults: &T,
    logger: &Logger,
) -> ConfigResult<T> {
    Pipeline {
        path,
        data_dir,
        defaults,
        logger,
    }
    .run()
    .map(|loaded| loaded.config)
}

struct Pipeline<'a, T> {
    path: &'a Path,
    data_dir: &'a Path,
    defaults: &'a T,
    logger: &'a Logger,
}

impl<T: ConfigSchema> Pipeline<'_, T> {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn run(&self) -> ConfigResult<Loaded<T>> {
        let name = self.name();
        if !self.path.exists() {
            self.logger
                .info(&format!("Configuration '{}' not found, creating a new one.", name));
            let config = self.create()?;
            return Ok(self.finish(config, LoadOutcome::Created));
        }

        let bytes = files::read_file(self.path)?;
        let default_tree = codec::document_to_tree(self.defaults)?;

        let attempt = match codec::decode_bytes(&bytes).and_then(codec::decode_strict::<T>) {
            Ok(config) => {
                self.logger
                    .info(&format!("Configuration '{}' loaded in strict mode.", name));
                // Still merge: the schema may have gained fields the file lacks
                codec::document_to_tree(&config)
                    .map_err(|e| DecodeError::schema_mismatch(e.to_string()))
                    .and_then(|tree| self.reconcile(tree, default_tree))
                    .map(|reconciled| (reconciled, LoadOutcome::Loaded))
            }
            Err(err) => {
                self.logger.warning(&format!(
                    "Strict parsing of '{}' failed: {}.",
                    name, err
                ));
                let backup = self.backup();
                self.logger
                    .info(&format!("Merging configuration '{}' with defaults.", name));
                codec::decode_bytes(&bytes)
                    .and_then(codec::decode_tree)
                    .and_then(|tree| self.reconcile(tree, default_tree))
                    .map(|reconciled| (reconciled, LoadOutcome::Repaired { backup }))
            }
        };

        match attempt {
            Ok(((config, tree), outcome)) => {
                self.persist(&tree)?;
                Ok(self.finish(config, outcome))
            }
            Err(err) => {
                self.logger
                    .error(&format!("Merge of '{}' failed: {}.", name, err));
                self.logger.warning(&format!(
                    "Configuration '{}' is invalid, moving it aside and creating a new one.",
                    name
                ));
                let invalid = files::rename_invalid(self.path)?;
                self.logger.info(&format!(
                    "Invalid configuration kept at {}.",
                    invalid.display()
                ));
                let config = self.create()?;
                self.logger
                    .info(&format!("Configuration '{}' regenerated.", name));
                Ok(self.finish(config, LoadOutcome::Regenerated { invalid }))
            }
        }
    }

    fn finish(&self, config: T, outcome: LoadOutcome) -> Loaded<T> {
        debug!(path = %self.path.display(), outcome = %outcome, "configuration ready");
        Loaded { config, outcome }
    }

    /// Write the annotated defaults and read them back strictly.
    fn create(&self) -> ConfigResult<T> {
        files::ensure_dir(self.data_dir)?;
        let text = codec::encode_document(self.defaults)?;
        files::write_file(self.path, &annotate(&text, T::FIELDS))?;

        let bytes = files::read_file(self.path)?;
        let config = codec::decode_bytes(&bytes)
            .and_then(codec::decode_strict::<T>)
            .map_err(|source| ConfigError::SelfWrite {
                path: self.path.to_path_buf(),
                source,
            })?;
        self.logger
            .info(&format!("Configuration '{}' created and loaded.", self.name()));
        Ok(config)
    }

    /// Best-effort copy of the current file. Failure is only logged.
    fn backup(&self) -> Option<PathBuf> {
        match files::backup(self.path) {
            Ok(target) => {
                self.logger.info(&format!(
                    "Backup of '{}' saved to {}.",
                    self.name(),
                    target.display()
                ));
                Some(target)
            }
            Err(err) => {
                self.logger.warning(&format!(
                    "Could not back up '{}': {}.",
                    self.name(),
                    err
                ));
                None
            }
        }
    }

    /// Merge `file_tree` with the defaults and decode the result.
    ///
    /// Returns the document and the tree to write: schema values as the
    /// typed document re-encodes them, extension keys as the file had them.
    fn reconcile(&self, file_tree: Tree, default_tree: Tree) -> Result<(T, Tree), DecodeError> {
        // An empty document has no keys at all
        let file_tree = match file_tree {
            Tree::Null => Tree::Mapping(Mapping::new()),
            tree => tree,
        };
        let extensions = extension_keys(&file_tree, &default_tree);
        if !extensions.is_empty() {
            self.logger.info(&format!(
                "Keeping keys of '{}' not known to the schema: {}.",
                self.name(),
                extensions.join(", ")
            ));
        }

        let merged = merge(file_tree, default_tree);
        let config: T = codec::decode_tree_to_document(merged.clone())?;
        let typed = codec::document_to_tree(&config)
            .map_err(|e| DecodeError::schema_mismatch(e.to_string()))?;
        Ok((config, merge(typed, merged)))
    }

    fn persist(&self, tree: &Tree) -> ConfigResult<()> {
        let text = codec::encode_tree(tree)?;
        files::write_file(self.path, &annotate(&text, T::FIELDS))
    }
}
