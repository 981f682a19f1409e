//! Registration of indexed files as persisted components.
//!
//! Runs after file indexing for a module: derives each file's legacy
//! key, migrates stored keys once per module, persists a resource and
//! snapshot per file (parents were registered by the scan before
//! descending here) and optionally imports source content. Sources are
//! read exactly once per file; a decode failure is fatal and names the
//! file and the configured encoding.

use crate::core::{Error, FileType, Result};
use crate::index::key_migration::ResourceKeyMigration;
use crate::index::resource::Resource;
use crate::index::resource_persister::ResourcePersister;
use crate::persistence::Database;
use crate::scan::filesystem::input_file::InputFile;
use crate::scan::filesystem::module_fs::ModuleFileSystem;
use std::sync::Arc;

pub struct ComponentIndexer {
    db: Arc<dyn Database>,
    import_sources: bool,
    encoding: String,
}

impl ComponentIndexer {
    pub fn new(db: Arc<dyn Database>, import_sources: bool, encoding: impl Into<String>) -> Self {
        Self {
            db,
            import_sources,
            encoding: encoding.into(),
        }
    }

    /// Register every indexed file of the module as a component.
    /// `project_id` and `module_resource_id` are the already persisted
    /// parents of the file resources.
    pub fn execute(
        &self,
        fs: &mut ModuleFileSystem,
        persister: &ResourcePersister,
        project_id: i64,
        module_resource_id: i64,
    ) -> Result<()> {
        self.assign_deprecated_keys(fs);

        let migration = ResourceKeyMigration::new(Arc::clone(&self.db));
        migration.migrate_if_needed(fs.module_key(), fs.catalog().files())?;

        let files: Vec<InputFile> = fs.catalog().files().cloned().collect();
        for file in files {
            let Some(key) = file.key() else { continue };
            let resource = Resource::new_file(
                key,
                file.relative_path(),
                file.language().map(str::to_string),
                file.file_type() == FileType::Test,
                project_id,
                module_resource_id,
            );
            let resource = match file.deprecated_key() {
                Some(deprecated) => resource
                    .with_deprecated_key(format!("{}:{}", fs.module_key(), deprecated)),
                None => resource,
            };
            let (_, snapshot_id) = persister.save(resource)?;

            if self.import_sources {
                let source = self.read_source(&file)?;
                let mut session = self.db.open_session(true)?;
                session.attach_source(snapshot_id, &source)?;
            }
        }
        Ok(())
    }

    /// Compute the legacy key of each file and push it back into the
    /// catalog. Java files keep their historical dotted class-name keys;
    /// everything else uses the source-root-relative path.
    fn assign_deprecated_keys(&self, fs: &mut ModuleFileSystem) {
        let files: Vec<InputFile> = fs.catalog().files().cloned().collect();
        for file in files {
            let deprecated = deprecated_key_of(&file);
            fs.catalog_mut().add(file.with_deprecated_key(deprecated));
        }
    }

    /// Read the file once and return its text, stripping a leading BOM.
    /// Content that is not valid in the configured encoding aborts the
    /// scan rather than storing mangled sources.
    fn read_source(&self, file: &InputFile) -> Result<String> {
        let bytes = std::fs::read(file.absolute_path())?;
        let text = String::from_utf8(bytes).map_err(|_| {
            Error::indexing(
                file.absolute_path(),
                format!(
                    "Unable to read and import the source file '{}' with the charset '{}'",
                    file.absolute_path().display(),
                    self.encoding
                ),
            )
        })?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
    }
}

/// Legacy key of a file, relative to its module
fn deprecated_key_of(file: &InputFile) -> String {
    let base = file
        .path_relative_to_source_dir()
        .unwrap_or_else(|| file.relative_path());
    if file.language() == Some("java") {
        let without_extension = match base.rfind('.') {
            Some(dot) => &base[..dot],
            None => base,
        };
        without_extension.replace('/', ".")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn java_file(source_dir_relative: &str) -> InputFile {
        InputFile::new(
            &format!("src/main/java/{}", source_dir_relative),
            PathBuf::from("/p/src/main/java").join(source_dir_relative),
            FileType::Main,
        )
        .with_language("java")
        .with_path_relative_to_source_dir(source_dir_relative)
    }

    #[test]
    fn test_java_legacy_key_is_dotted_class_name() {
        assert_eq!(
            deprecated_key_of(&java_file("org/foo/Bar.java")),
            "org.foo.Bar"
        );
    }

    #[test]
    fn test_non_java_legacy_key_is_source_dir_relative_path() {
        let file = InputFile::new("src/lib.rs", PathBuf::from("/p/src/lib.rs"), FileType::Main)
            .with_language("rust")
            .with_path_relative_to_source_dir("lib.rs");
        assert_eq!(deprecated_key_of(&file), "lib.rs");
    }

    #[test]
    fn test_legacy_key_falls_back_to_relative_path() {
        // explicit file lists have no owning source root
        let file = InputFile::new("src/a.py", PathBuf::from("/p/src/a.py"), FileType::Main)
            .with_language("python");
        assert_eq!(deprecated_key_of(&file), "src/a.py");
    }
}
