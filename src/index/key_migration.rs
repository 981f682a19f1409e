//! One-shot migration of file component keys from their legacy form to
//! the path-based form.
//!
//! Older storage identified files by a language-specific key (dotted
//! class names for java, source-root-relative paths otherwise). The
//! current key is always the module-relative path. The migration renames
//! every stored key once per module, records completion and is a no-op
//! on every later scan, so running it twice is always safe.

use crate::core::Result;
use crate::persistence::Database;
use crate::scan::filesystem::input_file::InputFile;
use std::sync::Arc;

pub struct ResourceKeyMigration {
    db: Arc<dyn Database>,
}

impl ResourceKeyMigration {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Rename stored legacy keys to effective keys for the module's
    /// files, unless the module is already recorded as migrated
    pub fn migrate_if_needed<'a>(
        &self,
        module_key: &str,
        files: impl Iterator<Item = &'a InputFile>,
    ) -> Result<()> {
        let mut session = self.db.open_session(false)?;
        if session.is_key_migrated(module_key)? {
            return Ok(());
        }
        log::info!("Update component keys of module {}", module_key);

        for file in files {
            let (Some(key), Some(deprecated)) = (file.key(), file.deprecated_key()) else {
                continue;
            };
            let old_key = format!("{}:{}", module_key, deprecated);
            if old_key != key {
                session.rename_resource_key(&old_key, key)?;
            }
        }
        session.mark_key_migrated(module_key)?;
        session.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileType;
    use crate::index::resource::Resource;
    use crate::persistence::MemoryDatabase;
    use std::path::PathBuf;

    fn indexed_file(relative: &str, deprecated: &str) -> InputFile {
        InputFile::new(relative, PathBuf::from("/p").join(relative), FileType::Main)
            .with_key(format!("mod:{}", relative))
            .with_deprecated_key(deprecated)
    }

    #[test]
    fn test_migration_renames_legacy_keys_once() {
        let db = MemoryDatabase::new();
        {
            let mut session = db.open_session(true).unwrap();
            session
                .insert_resource(&Resource::new_project("mod:org.foo.Bar", "Bar"))
                .unwrap();
        }

        let migration = ResourceKeyMigration::new(Arc::new(db.clone()));
        let files = vec![indexed_file("src/org/foo/Bar.java", "org.foo.Bar")];

        migration.migrate_if_needed("mod", files.iter()).unwrap();
        let renamed = db.resource_by_key("mod:src/org/foo/Bar.java").unwrap();
        assert_eq!(renamed.deprecated_key.as_deref(), Some("mod:org.foo.Bar"));

        // second run must not touch anything
        migration.migrate_if_needed("mod", files.iter()).unwrap();
        assert!(db.resource_by_key("mod:src/org/foo/Bar.java").is_some());
    }

    #[test]
    fn test_migration_skips_identical_keys() {
        let db = MemoryDatabase::new();
        let migration = ResourceKeyMigration::new(Arc::new(db.clone()));
        let files = vec![indexed_file("src/a.rs", "src/a.rs")];
        migration.migrate_if_needed("mod", files.iter()).unwrap();
        assert!(db.resources().is_empty());
    }
}
