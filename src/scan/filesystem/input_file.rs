//! Input file representation.
//!
//! Within one module, the sanitized relative path is the identity of a
//! file: equality and hashing use nothing else, and indexing the same
//! relative path twice in one pass is a hard error upstream.

use crate::core::{FileStatus, FileType};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// One discovered source or test file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFile {
    relative_path: String,
    absolute_path: PathBuf,
    file_type: FileType,
    language: Option<String>,
    status: Option<FileStatus>,
    hash: Option<String>,
    lines: usize,
    key: Option<String>,
    deprecated_key: Option<String>,
    path_relative_to_source_dir: Option<String>,
}

impl InputFile {
    pub fn new(relative_path: &str, absolute_path: PathBuf, file_type: FileType) -> Self {
        Self {
            relative_path: sanitize_path(relative_path),
            absolute_path,
            file_type,
            language: None,
            status: None,
            hash: None,
            lines: 0,
            key: None,
            deprecated_key: None,
            path_relative_to_source_dir: None,
        }
    }

    /// Sanitized path, relative to the module base directory. Immutable
    /// once constructed.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Language key, `None` until detection ran during `complete`
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Change status, `None` until computed against the previous scan
    pub fn status(&self) -> Option<FileStatus> {
        self.status
    }

    /// Content digest, `None` until computed
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Component key, `None` until assigned by the indexer
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Legacy key retained for backward-compatible joins against older data
    pub fn deprecated_key(&self) -> Option<&str> {
        self.deprecated_key.as_deref()
    }

    /// Path relative to the owning source root, when the file was found
    /// through directory crawling. Used for legacy key derivation.
    pub fn path_relative_to_source_dir(&self) -> Option<&str> {
        self.path_relative_to_source_dir.as_deref()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_deprecated_key(mut self, key: impl Into<String>) -> Self {
        self.deprecated_key = Some(key.into());
        self
    }

    pub fn with_path_relative_to_source_dir(mut self, path: &str) -> Self {
        self.path_relative_to_source_dir = Some(sanitize_path(path));
        self
    }
}

impl PartialEq for InputFile {
    fn eq(&self, other: &Self) -> bool {
        self.relative_path == other.relative_path
    }
}

impl Eq for InputFile {}

impl Hash for InputFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relative_path.hash(state);
    }
}

impl std::fmt::Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[relative={}, abs={}]",
            self.relative_path,
            self.absolute_path.display()
        )
    }
}

/// Normalize a path to forward slashes without a leading `./`
pub fn sanitize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let trimmed = normalized.strip_prefix("./").unwrap_or(&normalized);
    trimmed.trim_end_matches('/').to_string()
}
