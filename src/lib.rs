// Export modules for library usage
pub mod cli;
pub mod config;
pub mod core;
pub mod index;
pub mod issues;
pub mod measures;
pub mod persistence;
pub mod phases;
pub mod scan;

// Re-export commonly used types
pub use crate::config::{ProjectConfig, Settings};
pub use crate::core::{Error, FileStatus, FileType, Language, Languages, Result, Severity};
pub use crate::issues::Issue;
pub use crate::measures::{Measure, MetricRegistry, PersistenceMode};
pub use crate::persistence::{Database, MemoryDatabase, Rule, RuleFinder, RuleKey};
pub use crate::scan::reactor::{ModuleDefinition, ProjectReactor};
pub use crate::scan::{ProjectScope, ScanSummary};
