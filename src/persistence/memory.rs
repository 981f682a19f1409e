//! In-memory database used by the binary and by tests.
//!
//! Behaves like the relational collaborator it stands in for: sessions
//! opened without autocommit buffer their writes and apply them on
//! `commit`, so an aborted persist leaves nothing behind. Ids are
//! allocated eagerly so callers can wire parent/child references before
//! committing.

use crate::core::{Error, Result};
use crate::index::resource::{Resource, Snapshot};
use crate::persistence::{Database, DbSession, IssueRow, MeasureRow};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    resources: HashMap<i64, Resource>,
    resource_ids_by_key: HashMap<String, i64>,
    snapshots: HashMap<i64, Snapshot>,
    sources: HashMap<i64, String>,
    measures: Vec<MeasureRow>,
    issues: HashMap<String, IssueRow>,
    file_hashes: HashMap<String, HashMap<String, String>>,
    migrated_modules: HashSet<String>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn apply(&mut self, op: Op) -> Result<()> {
        match op {
            Op::InsertResource(id, mut resource) => {
                resource.id = Some(id);
                self.resource_ids_by_key.insert(resource.key.clone(), id);
                self.resources.insert(id, resource);
            }
            Op::InsertSnapshot(id, mut snapshot) => {
                snapshot.id = Some(id);
                self.snapshots.insert(id, snapshot);
            }
            Op::AttachSource(snapshot_id, source) => {
                self.sources.insert(snapshot_id, source);
            }
            Op::InsertMeasure(row) => {
                self.measures.push(row);
            }
            Op::InsertIssue(row) => {
                if self.issues.contains_key(&row.key) {
                    return Err(Error::persistence(
                        format!("issue [{}]", row.key),
                        "an issue with this key is already stored",
                    ));
                }
                self.issues.insert(row.key.clone(), row);
            }
            Op::UpdateIssue(row) => {
                if !self.issues.contains_key(&row.key) {
                    return Err(Error::persistence(
                        format!("issue [{}]", row.key),
                        "cannot update an issue that was never stored",
                    ));
                }
                self.issues.insert(row.key.clone(), row);
            }
            Op::ReplaceFileHashes(module_key, hashes) => {
                self.file_hashes.insert(module_key, hashes);
            }
            Op::MarkMigrated(module_key) => {
                self.migrated_modules.insert(module_key);
            }
            Op::RenameResourceKey(old_key, new_key) => {
                if let Some(id) = self.resource_ids_by_key.remove(&old_key) {
                    if let Some(resource) = self.resources.get_mut(&id) {
                        resource.deprecated_key = Some(old_key);
                        resource.key = new_key.clone();
                    }
                    self.resource_ids_by_key.insert(new_key, id);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Op {
    InsertResource(i64, Resource),
    InsertSnapshot(i64, Snapshot),
    AttachSource(i64, String),
    InsertMeasure(MeasureRow),
    InsertIssue(IssueRow),
    UpdateIssue(IssueRow),
    ReplaceFileHashes(String, HashMap<String, String>),
    MarkMigrated(String),
    RenameResourceKey(String, String),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    store: Arc<Mutex<Store>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measures(&self) -> Vec<MeasureRow> {
        self.store.lock().measures.clone()
    }

    pub fn issues(&self) -> Vec<IssueRow> {
        let mut issues: Vec<IssueRow> = self.store.lock().issues.values().cloned().collect();
        issues.sort_by(|a, b| a.key.cmp(&b.key));
        issues
    }

    pub fn issue(&self, key: &str) -> Option<IssueRow> {
        self.store.lock().issues.get(key).cloned()
    }

    pub fn resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self.store.lock().resources.values().cloned().collect();
        resources.sort_by_key(|r| r.id);
        resources
    }

    pub fn resource_by_key(&self, key: &str) -> Option<Resource> {
        let store = self.store.lock();
        let id = store.resource_ids_by_key.get(key)?;
        store.resources.get(id).cloned()
    }

    pub fn source_of(&self, snapshot_id: i64) -> Option<String> {
        self.store.lock().sources.get(&snapshot_id).cloned()
    }

    /// The snapshot created for a resource during this scan
    pub fn snapshot_id_of(&self, resource_key: &str) -> Option<i64> {
        let store = self.store.lock();
        let resource_id = *store.resource_ids_by_key.get(resource_key)?;
        store
            .snapshots
            .values()
            .find(|s| s.resource_id == resource_id)
            .and_then(|s| s.id)
    }

    pub fn stored_file_hashes(&self, module_key: &str) -> HashMap<String, String> {
        self.store
            .lock()
            .file_hashes
            .get(module_key)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed an issue row as if written by a previous scan or a user
    /// action through the web layer
    pub fn seed_issue(&self, row: IssueRow) {
        self.store.lock().issues.insert(row.key.clone(), row);
    }

    /// Seed the previous-pass file hashes for a module
    pub fn seed_file_hashes(&self, module_key: &str, hashes: HashMap<String, String>) {
        self.store
            .lock()
            .file_hashes
            .insert(module_key.to_string(), hashes);
    }
}

impl Database for MemoryDatabase {
    fn open_session(&self, autocommit: bool) -> Result<Box<dyn DbSession>> {
        Ok(Box::new(MemorySession {
            store: Arc::clone(&self.store),
            autocommit,
            pending: Vec::new(),
        }))
    }
}

struct MemorySession {
    store: Arc<Mutex<Store>>,
    autocommit: bool,
    pending: Vec<Op>,
}

impl MemorySession {
    fn record(&mut self, op: Op) -> Result<()> {
        if self.autocommit {
            self.store.lock().apply(op)
        } else {
            self.pending.push(op);
            Ok(())
        }
    }
}

impl DbSession for MemorySession {
    fn insert_resource(&mut self, resource: &Resource) -> Result<i64> {
        let id = self.store.lock().allocate_id();
        self.record(Op::InsertResource(id, resource.clone()))?;
        Ok(id)
    }

    fn insert_snapshot(&mut self, snapshot: &Snapshot) -> Result<i64> {
        let id = self.store.lock().allocate_id();
        self.record(Op::InsertSnapshot(id, snapshot.clone()))?;
        Ok(id)
    }

    fn attach_source(&mut self, snapshot_id: i64, source: &str) -> Result<()> {
        self.record(Op::AttachSource(snapshot_id, source.to_string()))
    }

    fn insert_measure(&mut self, row: MeasureRow) -> Result<()> {
        self.record(Op::InsertMeasure(row))
    }

    fn select_issue(&self, key: &str) -> Result<Option<IssueRow>> {
        Ok(self.store.lock().issues.get(key).cloned())
    }

    fn insert_issue(&mut self, row: IssueRow) -> Result<()> {
        if self.store.lock().issues.contains_key(&row.key) {
            return Err(Error::persistence(
                format!("issue [{}]", row.key),
                "an issue with this key is already stored",
            ));
        }
        self.record(Op::InsertIssue(row))
    }

    fn update_issue(&mut self, row: IssueRow) -> Result<()> {
        if !self.store.lock().issues.contains_key(&row.key) {
            return Err(Error::persistence(
                format!("issue [{}]", row.key),
                "cannot update an issue that was never stored",
            ));
        }
        self.record(Op::UpdateIssue(row))
    }

    fn load_file_hashes(&self, module_key: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .store
            .lock()
            .file_hashes
            .get(module_key)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_file_hashes(
        &mut self,
        module_key: &str,
        hashes: &HashMap<String, String>,
    ) -> Result<()> {
        self.record(Op::ReplaceFileHashes(module_key.to_string(), hashes.clone()))
    }

    fn is_key_migrated(&self, module_key: &str) -> Result<bool> {
        Ok(self.store.lock().migrated_modules.contains(module_key))
    }

    fn mark_key_migrated(&mut self, module_key: &str) -> Result<()> {
        self.record(Op::MarkMigrated(module_key.to_string()))
    }

    fn rename_resource_key(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        self.record(Op::RenameResourceKey(
            old_key.to_string(),
            new_key.to_string(),
        ))
    }

    fn commit(&mut self) -> Result<()> {
        let mut store = self.store.lock();
        for op in self.pending.drain(..) {
            store.apply(op)?;
        }
        Ok(())
    }
}
