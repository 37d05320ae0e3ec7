//! Filesystem side of the load pipeline.
//!
//! Naming of the backup and invalid-file artifacts, plus thin wrappers that
//! turn I/O failures into [`ConfigError`]s carrying the offending path.
//! Artifacts are only ever created; nothing here deletes a file.

use crate::error::{ConfigError, ConfigResult};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format used in invalid-file names.
pub const INVALID_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Split a file name into stem and optional extension.
fn stem_and_extension(path: &Path) -> (OsString, Option<OsString>) {
    let stem = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("config"));
    let ext = path.extension().map(|e| e.to_os_string());
    (stem, ext)
}

fn sibling(path: &Path, stem: OsString, suffix: &str, ext: Option<OsString>) -> PathBuf {
    let mut name = stem;
    name.push(suffix);
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// `<stem>-backup.<ext>` next to `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let (stem, ext) = stem_and_extension(path);
    sibling(path, stem, "-backup", ext)
}

/// `<stem>_invalid_<yyyy-MM-dd_HH-mm-ss>.<ext>` next to `path`.
pub fn invalid_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let (stem, ext) = stem_and_extension(path);
    let suffix = format!("_invalid_{}", at.format(INVALID_TIMESTAMP_FORMAT));
    sibling(path, stem, &suffix, ext)
}

/// Like [`invalid_path`], but never returns an existing file: a `-N`
/// counter is appended when two renames land in the same second.
pub fn free_invalid_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let candidate = invalid_path(path, at);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = stem_and_extension(path);
    let stamp = at.format(INVALID_TIMESTAMP_FORMAT);
    (1..)
        .map(|n| sibling(path, stem.clone(), &format!("_invalid_{}-{}", stamp, n), ext.clone()))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Create `dir` (and parents) if it does not exist yet.
pub(crate) fn ensure_dir(dir: &Path) -> ConfigResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

pub(crate) fn read_file(path: &Path) -> ConfigResult<Vec<u8>> {
    fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` and flush it to disk before returning.
pub(crate) fn write_file(path: &Path, contents: &str) -> ConfigResult<()> {
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    };
    write().map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy `path` to its backup name, overwriting a previous backup.
pub(crate) fn backup(path: &Path) -> std::io::Result<PathBuf> {
    let target = backup_path(path);
    fs::copy(path, &target)?;
    Ok(target)
}

/// Move `path` out of the way under a timestamped invalid name.
pub(crate) fn rename_invalid(path: &Path) -> ConfigResult<PathBuf> {
    let target = free_invalid_path(path, Local::now());
    fs::rename(path, &target).map_err(|source| ConfigError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    Ok(target)
}
