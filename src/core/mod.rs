pub mod errors;
pub mod types;

pub use errors::{Error, Result};
pub use types::{FileStatus, FileType, Language, Languages, Severity};
