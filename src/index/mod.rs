//! Component index and end-of-scan persistence.
//!
//! During the scan everything is accumulated in project-scoped caches;
//! nothing except resources touches storage until all modules are done.
//! Each `ScanPersister` then flushes one cache in a single transactional
//! session, so a failing flush leaves storage untouched.

pub mod file_hash_persister;
pub mod key_migration;
pub mod measure_persister;
pub mod resource;
pub mod resource_persister;

pub use file_hash_persister::{FileHashPersister, FileHashes};
pub use key_migration::ResourceKeyMigration;
pub use measure_persister::MeasurePersister;
pub use resource::{Qualifier, Resource, ResourceCache, Scope, Snapshot, SnapshotCache};
pub use resource_persister::ResourcePersister;

use crate::core::Result;

/// End-of-scan flush of one project-scoped cache
pub trait ScanPersister {
    fn persist(&self) -> Result<()>;

    /// Short label used in logs
    fn name(&self) -> &'static str;
}
