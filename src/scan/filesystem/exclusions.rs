//! Inclusion/exclusion pattern chain applied to candidate files before
//! they are completed and indexed. Accept/reject is a pure predicate on
//! the sanitized relative path; invalid pattern syntax is a configuration
//! error raised at prepare time, before any crawling.

use crate::config::Settings;
use crate::core::{Error, FileType, Result};
use glob::Pattern;

#[derive(Debug)]
pub struct ExclusionFilters {
    main_inclusions: Vec<Pattern>,
    main_exclusions: Vec<Pattern>,
    test_inclusions: Vec<Pattern>,
    test_exclusions: Vec<Pattern>,
}

impl ExclusionFilters {
    pub fn prepare(settings: &Settings) -> Result<Self> {
        Ok(Self {
            main_inclusions: compile(&settings.source_inclusions)?,
            main_exclusions: compile(&settings.source_exclusions)?,
            test_inclusions: compile(&settings.test_inclusions)?,
            test_exclusions: compile(&settings.test_exclusions)?,
        })
    }

    /// Accept a candidate relative path for the given file type.
    /// Empty inclusions accept everything; exclusions win over inclusions.
    pub fn accept(&self, relative_path: &str, file_type: FileType) -> bool {
        let (inclusions, exclusions) = match file_type {
            FileType::Main => (&self.main_inclusions, &self.main_exclusions),
            FileType::Test => (&self.test_inclusions, &self.test_exclusions),
        };
        let included =
            inclusions.is_empty() || inclusions.iter().any(|p| p.matches(relative_path));
        included && !exclusions.iter().any(|p| p.matches(relative_path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| Error::configuration(format!("Invalid file pattern '{}': {}", p, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(
        source_inclusions: &[&str],
        source_exclusions: &[&str],
        test_inclusions: &[&str],
    ) -> Settings {
        Settings {
            source_inclusions: source_inclusions.iter().map(|s| s.to_string()).collect(),
            source_exclusions: source_exclusions.iter().map(|s| s.to_string()).collect(),
            test_inclusions: test_inclusions.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_empty_inclusions_accept_all() {
        let filters = ExclusionFilters::prepare(&Settings::default()).unwrap();
        assert!(filters.accept("src/Foo.java", FileType::Main));
        assert!(filters.accept("anything/at/all.rs", FileType::Test));
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let filters =
            ExclusionFilters::prepare(&settings(&["src/**"], &["src/generated/**"], &[])).unwrap();
        assert!(filters.accept("src/Foo.java", FileType::Main));
        assert!(!filters.accept("src/generated/Foo.java", FileType::Main));
        assert!(!filters.accept("other/Foo.java", FileType::Main));
    }

    #[test]
    fn test_patterns_are_per_file_type() {
        let filters =
            ExclusionFilters::prepare(&settings(&["src/**"], &[], &["tests/**"])).unwrap();
        assert!(filters.accept("tests/foo.rs", FileType::Test));
        assert!(!filters.accept("tests/foo.rs", FileType::Main));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = ExclusionFilters::prepare(&settings(&["src/[**"], &[], &[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("src/[**"));
    }
}
