//! Scan settings and project configuration file loading.
//!
//! Settings are the key/value contract consumed by the pipeline:
//! inclusion/exclusion patterns, the source-import toggle, encoding and
//! work directory. A `ProjectConfig` bundles settings with the declared
//! module tree and is what the CLI loads from a TOML file.

use crate::core::{Error, Result};
use crate::scan::reactor::ModuleDefinition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scan-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Glob patterns a main file must match to be indexed (empty = all)
    #[serde(default)]
    pub source_inclusions: Vec<String>,

    /// Glob patterns excluding main files from indexing
    #[serde(default)]
    pub source_exclusions: Vec<String>,

    /// Glob patterns a test file must match to be indexed (empty = all)
    #[serde(default)]
    pub test_inclusions: Vec<String>,

    /// Glob patterns excluding test files from indexing
    #[serde(default)]
    pub test_exclusions: Vec<String>,

    /// Import raw source text into the snapshot for diff/annotation features
    #[serde(default = "default_import_sources")]
    pub import_sources: bool,

    /// Encoding of input files
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Force every indexed file to this language key instead of detecting
    /// by extension
    #[serde(default)]
    pub forced_language: Option<String>,

    /// Work directory, relative to each module base directory
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

fn default_import_sources() -> bool {
    true
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_work_dir() -> String {
    ".batchscan".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_inclusions: Vec::new(),
            source_exclusions: Vec::new(),
            test_inclusions: Vec::new(),
            test_exclusions: Vec::new(),
            import_sources: default_import_sources(),
            encoding: default_encoding(),
            forced_language: None,
            work_dir: default_work_dir(),
        }
    }
}

/// Project configuration file: settings plus the declared module tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub settings: Settings,
    pub project: ModuleDefinition,
}

impl ProjectConfig {
    /// Load a project configuration from a TOML file. Module base
    /// directories are resolved relative to the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Unable to read project configuration '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config: ProjectConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Invalid project configuration '{}': {}",
                path.display(),
                e
            ))
        })?;
        let anchor = path.parent().unwrap_or_else(|| Path::new("."));
        resolve_base_dirs(&mut config.project, anchor);
        Ok(config)
    }
}

fn resolve_base_dirs(definition: &mut ModuleDefinition, anchor: &Path) {
    if definition.base_dir.is_relative() {
        definition.base_dir = anchor.join(&definition.base_dir);
    }
    let base: PathBuf = definition.base_dir.clone();
    for sub in &mut definition.modules {
        resolve_base_dirs(sub, &base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(settings.import_sources);
        assert_eq!(settings.encoding, "UTF-8");
        assert_eq!(settings.work_dir, ".batchscan");
        assert!(settings.source_inclusions.is_empty());
        assert!(settings.forced_language.is_none());
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let settings: Settings = toml::from_str(
            r#"
            source_exclusions = ["**/generated/**"]
            import_sources = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.source_exclusions, vec!["**/generated/**"]);
        assert!(!settings.import_sources);
        assert_eq!(settings.encoding, "UTF-8");
    }

    #[test]
    fn test_project_config_parses_module_tree() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [project]
            key = "org.example:root"
            base_dir = "."
            sources = ["src"]

            [[project.modules]]
            key = "org.example:child"
            base_dir = "child"
            sources = ["src"]
            "#,
        )
        .unwrap();
        assert_eq!(config.project.key, "org.example:root");
        assert_eq!(config.project.modules.len(), 1);
        assert_eq!(config.project.modules[0].key, "org.example:child");
    }
}
