//! Module-scoped catalog of indexed input files.
//!
//! Owned exclusively by the module scope, discarded when the module scan
//! completes. The backing map guarantees at most one entry per relative
//! path; derived indices answer by-language and by-type queries without
//! rescanning.

use crate::core::{FileType, Language, Languages};
use crate::scan::filesystem::input_file::InputFile;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct FileCatalog {
    files: BTreeMap<String, InputFile>,
    by_language: HashMap<String, BTreeSet<String>>,
    by_type: HashMap<FileType, BTreeSet<String>>,
}

impl FileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous entry for the same relative
    /// path. Duplicate detection is the indexer's job; the catalog only
    /// guarantees single-entry-per-path.
    pub fn add(&mut self, file: InputFile) {
        let path = file.relative_path().to_string();
        if let Some(previous) = self.files.remove(&path) {
            self.unindex(&previous);
        }
        if let Some(language) = file.language() {
            self.by_language
                .entry(language.to_string())
                .or_default()
                .insert(path.clone());
        }
        self.by_type
            .entry(file.file_type())
            .or_default()
            .insert(path.clone());
        self.files.insert(path, file);
    }

    pub fn remove(&mut self, relative_path: &str) -> Option<InputFile> {
        let removed = self.files.remove(relative_path)?;
        self.unindex(&removed);
        Some(removed)
    }

    fn unindex(&mut self, file: &InputFile) {
        if let Some(language) = file.language() {
            if let Some(paths) = self.by_language.get_mut(language) {
                paths.remove(file.relative_path());
            }
        }
        if let Some(paths) = self.by_type.get_mut(&file.file_type()) {
            paths.remove(file.relative_path());
        }
    }

    pub fn get(&self, relative_path: &str) -> Option<&InputFile> {
        self.files.get(relative_path)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.files.contains_key(relative_path)
    }

    pub fn files(&self) -> impl Iterator<Item = &InputFile> {
        self.files.values()
    }

    pub fn relative_paths(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn by_language<'a>(&'a self, language: &str) -> impl Iterator<Item = &'a InputFile> {
        self.by_language
            .get(language)
            .into_iter()
            .flatten()
            .filter_map(|path| self.files.get(path))
    }

    pub fn by_type(&self, file_type: FileType) -> impl Iterator<Item = &InputFile> {
        self.by_type
            .get(&file_type)
            .into_iter()
            .flatten()
            .filter_map(|path| self.files.get(path))
    }

    /// Detected language keys, sorted
    pub fn languages(&self) -> BTreeSet<String> {
        self.by_language
            .iter()
            .filter(|(_, paths)| !paths.is_empty())
            .map(|(language, _)| language.clone())
            .collect()
    }

    /// Languages resolved against a registry, for reporting
    pub fn resolved_languages<'a>(&self, registry: &'a Languages) -> Vec<&'a Language> {
        self.languages()
            .iter()
            .filter_map(|key| registry.get(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
