//! Shared error types for the scan pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for batchscan operations.
///
/// The pipeline is fail-fast: indexing and phase errors abort the whole
/// scan, and persistence errors abort before anything is committed. The
/// variants mirror where in the scan lifecycle the failure happened.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration, detected before any file I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File indexing failures (duplicate index, unreadable content)
    #[error("Indexing error on '{path}': {message}")]
    Indexing { path: PathBuf, message: String },

    /// A sensor, decorator or post-job failed during phase execution
    #[error("Phase '{phase}' failed: {message}")]
    Phase { phase: String, message: String },

    /// End-of-scan persistence failures
    #[error("Persistence error ({context}): {message}")]
    Persistence { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an indexing error with path context
    pub fn indexing(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Indexing {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a phase error naming the offending extension
    pub fn phase(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Phase {
            phase: phase.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error with enough context to diagnose
    pub fn persistence(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_error_names_the_file() {
        let err = Error::indexing("src/Foo.java", "can't be indexed twice");
        assert!(err.to_string().contains("src/Foo.java"));
        assert!(err.to_string().contains("can't be indexed twice"));
    }

    #[test]
    fn test_persistence_error_carries_context() {
        let err = Error::persistence("metric [ncloc] on component [a:b]", "boom");
        assert!(err.to_string().contains("metric [ncloc]"));
    }
}
