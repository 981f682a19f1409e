//! Common type definitions used across the scan pipeline

use serde::{Deserialize, Serialize};

/// A language known to the scanner, resolved from configuration rather
/// than hardcoded: which languages a scan understands depends on what
/// the operator registered, not on a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub key: String,
    pub name: String,
    pub extensions: Vec<String>,
}

impl Language {
    pub fn new(key: impl Into<String>, name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Registry of languages available for a scan
#[derive(Debug, Clone)]
pub struct Languages {
    languages: Vec<Language>,
}

impl Languages {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    /// Default registry used when the project does not declare its own
    pub fn defaults() -> Self {
        Self::new(vec![
            Language::new("java", "Java", &["java"]),
            Language::new("rust", "Rust", &["rs"]),
            Language::new("python", "Python", &["py", "pyw"]),
            Language::new("js", "JavaScript", &["js", "jsx"]),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.key == key)
    }

    pub fn of_extension(&self, extension: &str) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| l.extensions.iter().any(|e| e == extension))
    }

    pub fn all(&self) -> &[Language] {
        &self.languages
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Whether an input file belongs to production or test sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Main,
    Test,
}

/// Change status of an input file relative to the previous scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Changed,
    Same,
}

/// Severity levels for rules and issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Critical => "CRITICAL",
            Severity::Blocker => "BLOCKER",
        }
    }
}
