//! End-of-scan flush of per-module file hashes.
//!
//! The hashes computed while indexing become the reference for the next
//! scan's status detection. Each module's map replaces the previous one
//! wholesale, so files removed since the last pass drop out naturally.

use crate::core::Result;
use crate::index::ScanPersister;
use crate::persistence::Database;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Accumulates (module key, relative path) -> hash during indexing
#[derive(Debug, Default)]
pub struct FileHashes {
    by_module: HashMap<String, HashMap<String, String>>,
}

impl FileHashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module_key: &str, relative_path: &str, hash: &str) {
        self.by_module
            .entry(module_key.to_string())
            .or_default()
            .insert(relative_path.to_string(), hash.to_string());
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &HashMap<String, String>)> {
        self.by_module.iter()
    }
}

pub struct FileHashPersister {
    db: Arc<dyn Database>,
    hashes: Arc<Mutex<FileHashes>>,
}

impl FileHashPersister {
    pub fn new(db: Arc<dyn Database>, hashes: Arc<Mutex<FileHashes>>) -> Self {
        Self { db, hashes }
    }
}

impl ScanPersister for FileHashPersister {
    fn persist(&self) -> Result<()> {
        let mut session = self.db.open_session(false)?;
        let hashes = self.hashes.lock();
        for (module_key, module_hashes) in hashes.modules() {
            session.replace_file_hashes(module_key, module_hashes)?;
        }
        session.commit()
    }

    fn name(&self) -> &'static str {
        "file hashes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryDatabase;

    #[test]
    fn test_flush_replaces_previous_hashes() {
        let db = MemoryDatabase::new();
        db.seed_file_hashes(
            "mod",
            HashMap::from([("gone.rs".to_string(), "aaaa".to_string())]),
        );

        let hashes = Arc::new(Mutex::new(FileHashes::new()));
        hashes.lock().record("mod", "src/a.rs", "bbbb");

        let persister = FileHashPersister::new(Arc::new(db.clone()), hashes);
        persister.persist().unwrap();

        let stored = db.stored_file_hashes("mod");
        assert_eq!(stored.get("src/a.rs").map(String::as_str), Some("bbbb"));
        assert!(!stored.contains_key("gone.rs"));
    }
}
