//! File indexing for one module.
//!
//! Crawls the configured source and test roots (or the explicit file
//! lists, which bypass crawling entirely for their file type), applies
//! the exclusion filter chain, completes each surviving candidate with
//! language, hash and status, and populates the module catalog.
//!
//! Indexing the same relative path twice in one pass is a hard failure:
//! a duplicate would silently corrupt downstream measure and issue keys.
//! Per-file read errors are equally fatal since every subsequent phase
//! assumes a complete, consistent file set.

use crate::core::{Error, FileType, Result};
use crate::scan::filesystem::exclusions::ExclusionFilters;
use crate::scan::filesystem::input_file::{sanitize_path, InputFile};
use crate::scan::filesystem::language_detection::LanguageDetection;
use crate::scan::filesystem::module_fs::ModuleFileSystem;
use crate::scan::filesystem::status_detection::{compute_hash, StatusDetection};
use crate::scan::reactor::ModuleDefinition;
use ignore::WalkBuilder;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Pluggable veto over completed input files, run after the exclusion
/// chain. Rejection skips the file, it never fails the scan.
pub trait InputFileFilter {
    fn accept(&self, file: &InputFile) -> bool;
}

pub struct FileIndexer<'a> {
    definition: &'a ModuleDefinition,
    exclusions: &'a ExclusionFilters,
    languages: &'a LanguageDetection,
    statuses: &'a StatusDetection,
    filters: &'a [Box<dyn InputFileFilter>],
}

impl<'a> FileIndexer<'a> {
    pub fn new(
        definition: &'a ModuleDefinition,
        exclusions: &'a ExclusionFilters,
        languages: &'a LanguageDetection,
        statuses: &'a StatusDetection,
        filters: &'a [Box<dyn InputFileFilter>],
    ) -> Self {
        Self {
            definition,
            exclusions,
            languages,
            statuses,
            filters,
        }
    }

    /// Index the module's files into the catalog. Returns the relative
    /// paths of files seen in the previous pass but absent now; those
    /// entries are evicted from the catalog.
    pub fn index(&self, fs: &mut ModuleFileSystem) -> Result<Vec<String>> {
        if self.definition.is_aggregator() {
            // No indexing for an aggregator module
            return Ok(Vec::new());
        }
        log::info!("Index files");

        let mut progress = Progress::new(
            fs.catalog()
                .relative_paths()
                .cloned()
                .chain(self.statuses.previous_paths().cloned()),
        );

        if self.definition.has_explicit_files() {
            // Index only provided files
            self.index_listed(fs, &self.definition.source_files, FileType::Main, &mut progress)?;
            self.index_listed(fs, &self.definition.test_files, FileType::Test, &mut progress)?;
        } else {
            for dir in &self.definition.sources {
                self.index_directory(fs, dir, FileType::Main, &mut progress)?;
            }
            for dir in &self.definition.tests {
                self.index_directory(fs, dir, FileType::Test, &mut progress)?;
            }
        }

        // Remove files that have been removed since the previous indexation
        let removed: Vec<String> = progress.removed.iter().cloned().collect();
        for path in &removed {
            fs.catalog_mut().remove(path);
        }

        log::info!("{} files indexed", progress.count());
        Ok(removed)
    }

    fn index_directory(
        &self,
        fs: &mut ModuleFileSystem,
        dir: &Path,
        file_type: FileType,
        progress: &mut Progress,
    ) -> Result<()> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            fs.base_dir().join(dir)
        };
        if !dir.is_dir() {
            return Err(Error::configuration(format!(
                "The directory '{}' of module '{}' does not exist",
                dir.display(),
                self.definition.key
            )));
        }
        let walker = WalkBuilder::new(&dir)
            .hidden(true)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a: &std::ffi::OsStr, b: &std::ffi::OsStr| a.cmp(b))
            .build();
        for entry in walker {
            let entry = entry.map_err(|e| Error::indexing(dir.clone(), e.to_string()))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            self.index_candidate(fs, entry.path(), Some(&dir), file_type, progress)?;
        }
        Ok(())
    }

    fn index_listed(
        &self,
        fs: &mut ModuleFileSystem,
        files: &[PathBuf],
        file_type: FileType,
        progress: &mut Progress,
    ) -> Result<()> {
        for file in files {
            let absolute = if file.is_absolute() {
                file.clone()
            } else {
                fs.base_dir().join(file)
            };
            if !absolute.is_file() {
                return Err(Error::indexing(
                    absolute,
                    "Listed file does not exist".to_string(),
                ));
            }
            self.index_candidate(fs, &absolute, None, file_type, progress)?;
        }
        Ok(())
    }

    fn index_candidate(
        &self,
        fs: &mut ModuleFileSystem,
        path: &Path,
        source_dir: Option<&Path>,
        file_type: FileType,
        progress: &mut Progress,
    ) -> Result<()> {
        let relative = pathdiff::diff_paths(path, fs.base_dir())
            .unwrap_or_else(|| path.to_path_buf());
        let relative = sanitize_path(&relative.to_string_lossy());

        let mut input_file = InputFile::new(&relative, path.to_path_buf(), file_type);
        if let Some(dir) = source_dir {
            if let Some(from_source_dir) = pathdiff::diff_paths(path, dir) {
                input_file = input_file
                    .with_path_relative_to_source_dir(&from_source_dir.to_string_lossy());
            }
        }

        if !self.exclusions.accept(&relative, file_type) {
            return Ok(());
        }
        if let Some(completed) = self.complete(input_file)? {
            progress.mark_as_indexed(&completed)?;
            fs.catalog_mut().add(completed);
        }
        Ok(())
    }

    /// Finalize a provisional file: language detection, content hash,
    /// status against the previous pass, component key, plugin filters.
    /// `None` means the file is filtered out, not an error.
    fn complete(&self, input_file: InputFile) -> Result<Option<InputFile>> {
        let Some(language) = self.languages.language_of(input_file.relative_path()) else {
            return Ok(None);
        };
        let content = std::fs::read(input_file.absolute_path()).map_err(|e| {
            Error::indexing(
                input_file.absolute_path(),
                format!("Unable to read file: {}", e),
            )
        })?;
        let hash = compute_hash(&content);
        let lines = String::from_utf8_lossy(&content).lines().count();
        let status = self.statuses.status(input_file.relative_path(), &hash);
        let key = format!("{}:{}", self.definition.key, input_file.relative_path());

        let completed = input_file
            .with_language(language)
            .with_hash(hash)
            .with_lines(lines)
            .with_status(status)
            .with_key(key);

        for filter in self.filters {
            if !filter.accept(&completed) {
                return Ok(None);
            }
        }
        Ok(Some(completed))
    }
}

/// Indexing bookkeeping: which paths were indexed this pass, and which
/// previously known paths have not been seen again
struct Progress {
    removed: BTreeSet<String>,
    indexed: HashSet<String>,
}

impl Progress {
    fn new(previously_known: impl Iterator<Item = String>) -> Self {
        Self {
            removed: previously_known.collect(),
            indexed: HashSet::new(),
        }
    }

    fn mark_as_indexed(&mut self, file: &InputFile) -> Result<()> {
        if !self.indexed.insert(file.relative_path().to_string()) {
            return Err(Error::indexing(
                file.absolute_path(),
                format!(
                    "File {} can't be indexed twice. Please check that inclusion/exclusion \
                     patterns produce disjoint sets for main and test files",
                    file
                ),
            ));
        }
        self.removed.remove(file.relative_path());
        Ok(())
    }

    fn count(&self) -> usize {
        self.indexed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_progress_detects_duplicate() {
        let mut progress = Progress::new(std::iter::empty());
        let file = InputFile::new("src/a.rs", PathBuf::from("/x/src/a.rs"), FileType::Main);
        progress.mark_as_indexed(&file).unwrap();
        let err = progress.mark_as_indexed(&file).unwrap_err();
        assert!(err.to_string().contains("can't be indexed twice"));
        assert!(err.to_string().contains("disjoint sets"));
    }

    #[test]
    fn test_progress_tracks_removed() {
        let mut progress = Progress::new(
            ["src/a.rs".to_string(), "src/gone.rs".to_string()].into_iter(),
        );
        let file = InputFile::new("src/a.rs", PathBuf::from("/x/src/a.rs"), FileType::Main);
        progress.mark_as_indexed(&file).unwrap();
        assert_eq!(
            progress.removed.iter().cloned().collect::<Vec<_>>(),
            vec!["src/gone.rs".to_string()]
        );
        assert_eq!(progress.count(), 1);
    }
}
