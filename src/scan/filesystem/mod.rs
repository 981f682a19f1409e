//! Module file system: discovery, indexing and the sensor-facing facade.

pub mod catalog;
pub mod component_indexer;
pub mod exclusions;
pub mod indexer;
pub mod input_file;
pub mod language_detection;
pub mod module_fs;
pub mod status_detection;

pub use catalog::FileCatalog;
pub use component_indexer::ComponentIndexer;
pub use exclusions::ExclusionFilters;
pub use indexer::{FileIndexer, InputFileFilter};
pub use input_file::InputFile;
pub use language_detection::LanguageDetection;
pub use module_fs::{FilePredicate, ModuleFileSystem};
pub use status_detection::{compute_hash, StatusDetection};
