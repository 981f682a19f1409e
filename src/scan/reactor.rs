//! Project reactor: the declared tree of modules consumed once at scan
//! start. A module owns a base directory plus source/test roots, or an
//! explicit list of files; a module with submodules but no inputs of its
//! own is an aggregator and never owns files directly.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Declaration of one module of the project tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub key: String,

    #[serde(default)]
    pub name: Option<String>,

    pub base_dir: PathBuf,

    /// Source root directories, relative to the base directory
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Test root directories, relative to the base directory
    #[serde(default)]
    pub tests: Vec<PathBuf>,

    /// Explicit main files; when present, directory crawling is bypassed
    /// for main files
    #[serde(default)]
    pub source_files: Vec<PathBuf>,

    /// Explicit test files; when present, directory crawling is bypassed
    /// for test files
    #[serde(default)]
    pub test_files: Vec<PathBuf>,

    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
}

impl ModuleDefinition {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// An aggregator has submodules and no file inputs of its own
    pub fn is_aggregator(&self) -> bool {
        !self.modules.is_empty()
            && self.sources.is_empty()
            && self.tests.is_empty()
            && self.source_files.is_empty()
            && self.test_files.is_empty()
    }

    pub fn has_explicit_files(&self) -> bool {
        !self.source_files.is_empty() || !self.test_files.is_empty()
    }
}

/// Validated module tree for one project scan
#[derive(Debug, Clone)]
pub struct ProjectReactor {
    root: ModuleDefinition,
}

impl ProjectReactor {
    /// Validate and wrap a declared module tree. Empty or duplicate module
    /// keys are configuration errors, surfaced before any file I/O.
    pub fn new(root: ModuleDefinition) -> Result<Self> {
        let mut keys = HashSet::new();
        validate(&root, &mut keys)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &ModuleDefinition {
        &self.root
    }

    /// Total number of modules in the tree, root included
    pub fn module_count(&self) -> usize {
        fn count(def: &ModuleDefinition) -> usize {
            1 + def.modules.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

fn validate(definition: &ModuleDefinition, keys: &mut HashSet<String>) -> Result<()> {
    if definition.key.trim().is_empty() {
        return Err(Error::configuration("Module key must not be empty"));
    }
    if !keys.insert(definition.key.clone()) {
        return Err(Error::configuration(format!(
            "Two modules are declared with the same key '{}'",
            definition.key
        )));
    }
    for sub in &definition.modules {
        validate(sub, keys)?;
    }
    Ok(())
}
