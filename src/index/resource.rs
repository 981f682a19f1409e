//! Persisted code units and their scan-wide caches.
//!
//! A resource is the persisted form of a project, module, directory or
//! file; a snapshot is the point-in-time record of its analysis. Both
//! caches are project-scoped, shared by every module child-scope, and
//! lazily populated as resources are persisted (always parent before
//! child, whatever order the scan itself visits modules).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of code unit a resource is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    Project,
    Module,
    Directory,
    File,
    UnitTest,
}

impl Qualifier {
    /// Leaf "entity" components (files) are subject to best-value
    /// measure elision
    pub fn is_entity(self) -> bool {
        matches!(self, Qualifier::File | Qualifier::UnitTest)
    }

    pub fn scope(self) -> Scope {
        match self {
            Qualifier::Project | Qualifier::Module => Scope::Project,
            Qualifier::Directory => Scope::Directory,
            Qualifier::File | Qualifier::UnitTest => Scope::File,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Project,
    Directory,
    File,
}

/// The persisted code unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Assigned by the persistence layer on first insert, never changed
    pub id: Option<i64>,
    pub key: String,
    pub deprecated_key: Option<String>,
    pub path: Option<String>,
    pub name: String,
    pub long_name: Option<String>,
    pub qualifier: Qualifier,
    pub language: Option<String>,
    /// Root project resource id; `None` on the root itself
    pub project_id: Option<i64>,
    /// Owning module resource id; `None` on project and root modules
    pub sub_project_id: Option<i64>,
    pub enabled: bool,
}

impl Resource {
    pub fn new_project(key: impl Into<String>, name: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: None,
            key: key.clone(),
            deprecated_key: Some(key),
            path: None,
            name: name.into(),
            long_name: None,
            qualifier: Qualifier::Project,
            language: None,
            project_id: None,
            sub_project_id: None,
            enabled: true,
        }
    }

    pub fn new_module(
        key: impl Into<String>,
        name: impl Into<String>,
        project_id: i64,
        sub_project_id: Option<i64>,
    ) -> Self {
        let key = key.into();
        Self {
            id: None,
            key: key.clone(),
            deprecated_key: Some(key),
            path: None,
            name: name.into(),
            long_name: None,
            qualifier: Qualifier::Module,
            language: None,
            project_id: Some(project_id),
            sub_project_id,
            enabled: true,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_file(
        key: impl Into<String>,
        path: impl Into<String>,
        language: Option<String>,
        unit_test: bool,
        project_id: i64,
        sub_project_id: i64,
    ) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or(path.as_str())
            .to_string();
        Self {
            id: None,
            key: key.into(),
            deprecated_key: None,
            path: Some(path.clone()),
            name,
            long_name: Some(path),
            qualifier: if unit_test {
                Qualifier::UnitTest
            } else {
                Qualifier::File
            },
            language,
            project_id: Some(project_id),
            sub_project_id: Some(sub_project_id),
            enabled: true,
        }
    }

    pub fn with_deprecated_key(mut self, key: impl Into<String>) -> Self {
        self.deprecated_key = Some(key.into());
        self
    }

    pub fn scope(&self) -> Scope {
        self.qualifier.scope()
    }
}

/// Point-in-time record of a component's analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Option<i64>,
    pub resource_id: i64,
    pub qualifier: Qualifier,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn of(resource: &Resource) -> Self {
        Self {
            id: None,
            resource_id: resource.id.unwrap_or_default(),
            qualifier: resource.qualifier,
            created_at: Utc::now(),
        }
    }
}

/// Project-scoped map of effective component key to persisted resource
#[derive(Debug, Default)]
pub struct ResourceCache {
    resources: HashMap<String, Resource>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, resource: Resource) {
        self.resources.insert(resource.key.clone(), resource);
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.resources.get(key)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Project-scoped map of effective component key to persisted snapshot
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<String, Snapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, snapshot: Snapshot) {
        self.snapshots.insert(key.into(), snapshot);
    }

    pub fn get(&self, key: &str) -> Option<&Snapshot> {
        self.snapshots.get(key)
    }
}
