//! Scan orchestration.
//!
//! `ProjectScope` wires the project-wide collaborators (storage, rules,
//! metrics, caches, extension registry) and walks the module tree.
//! Resources are registered parent before child, but submodules are
//! scanned before their parent's phases run, so aggregation decorators
//! can read child results from the shared caches. Measures, issues and
//! file hashes stay cached until every module is done and are then
//! flushed by the persisters, each in a single transaction.

pub mod filesystem;
pub mod reactor;

use crate::config::Settings;
use crate::core::{Languages, Result};
use crate::index::resource::{Resource, ResourceCache, SnapshotCache};
use crate::index::{
    FileHashPersister, FileHashes, MeasurePersister, ResourcePersister, ScanPersister,
};
use crate::issues::{IssueCache, IssuePersister};
use crate::measures::{MeasureCache, MetricRegistry};
use crate::persistence::{Database, RuleFinder};
use crate::phases::{ExtensionRegistry, PhaseExecutor, SensorContext};
use crate::scan::filesystem::{
    ComponentIndexer, ExclusionFilters, FileIndexer, InputFileFilter, LanguageDetection,
    ModuleFileSystem, StatusDetection,
};
use crate::scan::reactor::{ModuleDefinition, ProjectReactor};
use parking_lot::Mutex;
use std::sync::Arc;

/// What a finished scan produced, before persistence details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub modules_scanned: usize,
    pub files_indexed: usize,
    pub measures: usize,
    pub issues: usize,
}

/// Project-wide wiring for one scan
pub struct ProjectScope {
    settings: Settings,
    reactor: ProjectReactor,
    db: Arc<dyn Database>,
    rule_finder: Arc<dyn RuleFinder>,
    metrics: MetricRegistry,
    languages: Languages,
    registry: ExtensionRegistry,
    filters: Vec<Box<dyn InputFileFilter>>,
    measures: Arc<Mutex<MeasureCache>>,
    issues: Arc<Mutex<IssueCache>>,
    resources: Arc<Mutex<ResourceCache>>,
    snapshots: Arc<Mutex<SnapshotCache>>,
    file_hashes: Arc<Mutex<FileHashes>>,
}

impl ProjectScope {
    pub fn new(
        settings: Settings,
        reactor: ProjectReactor,
        db: Arc<dyn Database>,
        rule_finder: Arc<dyn RuleFinder>,
    ) -> Self {
        Self {
            settings,
            reactor,
            db,
            rule_finder,
            metrics: MetricRegistry::defaults(),
            languages: Languages::defaults(),
            registry: ExtensionRegistry::new(),
            filters: Vec::new(),
            measures: Arc::new(Mutex::new(MeasureCache::new())),
            issues: Arc::new(Mutex::new(IssueCache::new())),
            resources: Arc::new(Mutex::new(ResourceCache::new())),
            snapshots: Arc::new(Mutex::new(SnapshotCache::new())),
            file_hashes: Arc::new(Mutex::new(FileHashes::new())),
        }
    }

    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricRegistry) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_languages(mut self, languages: Languages) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_file_filter(mut self, filter: Box<dyn InputFileFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Run the whole scan: walk the module tree, then flush the caches
    pub fn scan(&self) -> Result<ScanSummary> {
        let root = self.reactor.root();
        log::info!("Scanning project {}", root.name());

        let resource_persister = ResourcePersister::new(
            Arc::clone(&self.db),
            Arc::clone(&self.resources),
            Arc::clone(&self.snapshots),
        );
        let (project_id, _) = resource_persister
            .save(Resource::new_project(root.key.clone(), root.name()))?;

        let mut files_indexed = 0;
        self.scan_recursively(
            root,
            &resource_persister,
            project_id,
            project_id,
            true,
            &mut files_indexed,
        )?;

        self.flush()?;

        Ok(ScanSummary {
            modules_scanned: self.reactor.module_count(),
            files_indexed,
            measures: self.measures.lock().len(),
            issues: self.issues.lock().len(),
        })
    }

    /// Register this module's children and scan them, then run phases on
    /// the module itself
    fn scan_recursively(
        &self,
        definition: &ModuleDefinition,
        resource_persister: &ResourcePersister,
        project_id: i64,
        module_resource_id: i64,
        is_root: bool,
        files_indexed: &mut usize,
    ) -> Result<()> {
        for child in &definition.modules {
            let (child_id, _) = resource_persister.save(Resource::new_module(
                child.key.clone(),
                child.name(),
                project_id,
                Some(module_resource_id),
            ))?;
            self.scan_recursively(
                child,
                resource_persister,
                project_id,
                child_id,
                false,
                files_indexed,
            )?;
        }
        self.scan_module(
            definition,
            resource_persister,
            project_id,
            module_resource_id,
            is_root,
            files_indexed,
        )
    }

    fn scan_module(
        &self,
        definition: &ModuleDefinition,
        resource_persister: &ResourcePersister,
        project_id: i64,
        module_resource_id: i64,
        is_root: bool,
        files_indexed: &mut usize,
    ) -> Result<()> {
        log::info!("-------------  Scan {}", definition.name());

        let previous_hashes = self
            .db
            .open_session(true)?
            .load_file_hashes(&definition.key)?;
        let statuses = StatusDetection::new(previous_hashes);
        let language_detection = LanguageDetection::new(self.languages.clone(), &self.settings)?;
        let exclusions = ExclusionFilters::prepare(&self.settings)?;
        let mut fs = ModuleFileSystem::new(definition, &self.settings)?;

        let indexer = FileIndexer::new(
            definition,
            &exclusions,
            &language_detection,
            &statuses,
            &self.filters,
        );
        indexer.index(&mut fs)?;
        *files_indexed += fs.catalog().len();

        {
            let mut hashes = self.file_hashes.lock();
            for file in fs.catalog().files() {
                if let Some(hash) = file.hash() {
                    hashes.record(&definition.key, file.relative_path(), hash);
                }
            }
        }

        let component_indexer = ComponentIndexer::new(
            Arc::clone(&self.db),
            self.settings.import_sources,
            self.settings.encoding.clone(),
        );
        component_indexer.execute(&mut fs, resource_persister, project_id, module_resource_id)?;

        let context = SensorContext::new(
            definition,
            &fs,
            &self.settings,
            &self.metrics,
            Arc::clone(&self.measures),
            Arc::clone(&self.issues),
        );
        PhaseExecutor::new(&self.registry).execute(&context, is_root)
    }

    /// Flush the accumulated caches, one persister at a time. Each runs
    /// in its own transaction; the first failure aborts without touching
    /// the remaining caches.
    fn flush(&self) -> Result<()> {
        let persisters: Vec<Box<dyn ScanPersister>> = vec![
            Box::new(MeasurePersister::new(
                Arc::clone(&self.db),
                self.metrics.clone(),
                Arc::clone(&self.rule_finder),
                Arc::clone(&self.measures),
                Arc::clone(&self.resources),
                Arc::clone(&self.snapshots),
            )),
            Box::new(IssuePersister::new(
                Arc::clone(&self.db),
                Arc::clone(&self.rule_finder),
                Arc::clone(&self.issues),
            )),
            Box::new(FileHashPersister::new(
                Arc::clone(&self.db),
                Arc::clone(&self.file_hashes),
            )),
        ];
        for persister in persisters {
            log::info!("Persist {}", persister.name());
            persister.persist()?;
        }
        Ok(())
    }
}
