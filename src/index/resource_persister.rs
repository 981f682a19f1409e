//! Immediate persistence of resources and snapshots.
//!
//! Unlike measures and issues, resources are written as soon as they are
//! registered: downstream persisters need the generated ids, and parents
//! must exist before children reference them. Sessions are autocommit
//! for that reason.

use crate::core::Result;
use crate::index::resource::{Resource, ResourceCache, Snapshot, SnapshotCache};
use crate::persistence::Database;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct ResourcePersister {
    db: Arc<dyn Database>,
    resources: Arc<Mutex<ResourceCache>>,
    snapshots: Arc<Mutex<SnapshotCache>>,
}

impl ResourcePersister {
    pub fn new(
        db: Arc<dyn Database>,
        resources: Arc<Mutex<ResourceCache>>,
        snapshots: Arc<Mutex<SnapshotCache>>,
    ) -> Self {
        Self {
            db,
            resources,
            snapshots,
        }
    }

    /// Insert the resource and its snapshot, populate both caches and
    /// return the generated (resource id, snapshot id) pair
    pub fn save(&self, mut resource: Resource) -> Result<(i64, i64)> {
        let mut session = self.db.open_session(true)?;

        let resource_id = session.insert_resource(&resource)?;
        resource.id = Some(resource_id);

        let mut snapshot = Snapshot::of(&resource);
        let snapshot_id = session.insert_snapshot(&snapshot)?;
        snapshot.id = Some(snapshot_id);

        self.snapshots
            .lock()
            .put(resource.key.clone(), snapshot);
        self.resources.lock().put(resource);

        Ok((resource_id, snapshot_id))
    }

    pub fn resources(&self) -> Arc<Mutex<ResourceCache>> {
        Arc::clone(&self.resources)
    }

    pub fn snapshots(&self) -> Arc<Mutex<SnapshotCache>> {
        Arc::clone(&self.snapshots)
    }
}
