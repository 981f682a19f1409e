//! File system facade consumed by sensors.
//!
//! Sensors locate files through predicates without knowing indexing
//! internals. The facade owns the module's catalog together with the
//! base/work directory and encoding accessors.

use crate::config::Settings;
use crate::core::{Error, FileType, Result};
use crate::scan::filesystem::catalog::FileCatalog;
use crate::scan::filesystem::input_file::InputFile;
use crate::scan::reactor::ModuleDefinition;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Predicate over input files, composable with `and`/`or`
#[derive(Debug, Clone)]
pub enum FilePredicate {
    All,
    HasLanguage(String),
    HasType(FileType),
    HasRelativePath(String),
    And(Vec<FilePredicate>),
    Or(Vec<FilePredicate>),
}

impl FilePredicate {
    pub fn has_language(key: impl Into<String>) -> Self {
        Self::HasLanguage(key.into())
    }

    pub fn has_type(file_type: FileType) -> Self {
        Self::HasType(file_type)
    }

    pub fn has_relative_path(path: impl Into<String>) -> Self {
        Self::HasRelativePath(path.into())
    }

    pub fn and(self, other: FilePredicate) -> Self {
        match self {
            Self::And(mut predicates) => {
                predicates.push(other);
                Self::And(predicates)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: FilePredicate) -> Self {
        match self {
            Self::Or(mut predicates) => {
                predicates.push(other);
                Self::Or(predicates)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub fn matches(&self, file: &InputFile) -> bool {
        match self {
            Self::All => true,
            Self::HasLanguage(key) => file.language() == Some(key.as_str()),
            Self::HasType(file_type) => file.file_type() == *file_type,
            Self::HasRelativePath(path) => file.relative_path() == path,
            Self::And(predicates) => predicates.iter().all(|p| p.matches(file)),
            Self::Or(predicates) => predicates.iter().any(|p| p.matches(file)),
        }
    }
}

/// Per-module view over the indexed files
#[derive(Debug)]
pub struct ModuleFileSystem {
    module_key: String,
    base_dir: PathBuf,
    work_dir: PathBuf,
    encoding: String,
    catalog: FileCatalog,
}

impl ModuleFileSystem {
    pub fn new(definition: &ModuleDefinition, settings: &Settings) -> Result<Self> {
        if !definition.base_dir.is_dir() {
            return Err(Error::configuration(format!(
                "The base directory of module '{}' does not exist: {}",
                definition.key,
                definition.base_dir.display()
            )));
        }
        let work_dir = definition.base_dir.join(&settings.work_dir);
        std::fs::create_dir_all(&work_dir)?;
        Ok(Self {
            module_key: definition.key.clone(),
            base_dir: definition.base_dir.clone(),
            work_dir,
            encoding: settings.encoding.clone(),
            catalog: FileCatalog::new(),
        })
    }

    pub fn module_key(&self) -> &str {
        &self.module_key
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Lazily iterate input files matching the predicate
    pub fn input_files<'a>(
        &'a self,
        predicate: &'a FilePredicate,
    ) -> impl Iterator<Item = &'a InputFile> {
        self.catalog.files().filter(|f| predicate.matches(f))
    }

    /// The single file matching the predicate; more than one match is an
    /// error, no match is `None`
    pub fn input_file(&self, predicate: &FilePredicate) -> Result<Option<&InputFile>> {
        // filter inline so the returned reference borrows the catalog,
        // not the predicate
        let mut matching = self.catalog.files().filter(|f| predicate.matches(f));
        let first = matching.next();
        if let Some(second) = matching.next() {
            return Err(Error::configuration(format!(
                "Expected one file to match the predicate but got at least two: {} and {}",
                first.map(|f| f.relative_path()).unwrap_or_default(),
                second.relative_path()
            )));
        }
        Ok(first)
    }

    /// Detected language keys, sorted
    pub fn languages(&self) -> BTreeSet<String> {
        self.catalog.languages()
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut FileCatalog {
        &mut self.catalog
    }
}
