//! Relational persistence collaborators, specified by contract.
//!
//! The scan core only knows `Database`/`DbSession`: open a session
//! (autocommit or transactional), perform typed mapper operations and
//! commit. Uncommitted work is discarded when a session is dropped, so
//! resources are released on every exit path, including errors. The row
//! shapes here are the write-side contract; the SQL engine behind them
//! stays out of scope.

pub mod memory;
pub mod rules;

pub use memory::MemoryDatabase;
pub use rules::{Rule, RuleFinder, RuleKey, StaticRuleFinder};

use crate::core::{Result, Severity};
use crate::index::resource::{Resource, Snapshot};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Persisted measure row
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRow {
    pub snapshot_id: i64,
    pub metric_id: i64,
    pub value: Option<f64>,
    pub data: Option<String>,
    pub description: Option<String>,
    pub alert_status: Option<String>,
    pub alert_text: Option<String>,
    pub tendency: Option<i32>,
    pub url: Option<String>,
    pub variations: [Option<f64>; 5],
    pub characteristic_id: Option<i64>,
    pub person_id: Option<i64>,
    pub rule_id: Option<i64>,
    pub rule_priority: Option<Severity>,
}

/// Persisted issue row
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRow {
    pub key: String,
    pub rule_id: i64,
    pub component_key: String,
    pub project_key: String,
    pub line: Option<u32>,
    pub message: Option<String>,
    pub severity: Severity,
    pub manual_severity: bool,
    pub status: String,
    pub resolution: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub author_login: Option<String>,
    pub checksum: Option<String>,
    pub effort_minutes: Option<i64>,
    pub attributes: BTreeMap<String, String>,
    pub creation_date: DateTime<Utc>,
    pub update_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    /// Storage-side timestamp of the last write, used for optimistic
    /// conflict detection against the scan's load time
    pub updated_at: DateTime<Utc>,
}

/// One unit of work against the store. Writes are only durable after
/// `commit`; a dropped session rolls back silently.
pub trait DbSession {
    fn insert_resource(&mut self, resource: &Resource) -> Result<i64>;
    fn insert_snapshot(&mut self, snapshot: &Snapshot) -> Result<i64>;
    fn attach_source(&mut self, snapshot_id: i64, source: &str) -> Result<()>;
    fn insert_measure(&mut self, row: MeasureRow) -> Result<()>;
    fn select_issue(&self, key: &str) -> Result<Option<IssueRow>>;
    fn insert_issue(&mut self, row: IssueRow) -> Result<()>;
    fn update_issue(&mut self, row: IssueRow) -> Result<()>;
    fn load_file_hashes(&self, module_key: &str) -> Result<HashMap<String, String>>;
    fn replace_file_hashes(
        &mut self,
        module_key: &str,
        hashes: &HashMap<String, String>,
    ) -> Result<()>;
    fn is_key_migrated(&self, module_key: &str) -> Result<bool>;
    fn mark_key_migrated(&mut self, module_key: &str) -> Result<()>;
    fn rename_resource_key(&mut self, old_key: &str, new_key: &str) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
}

/// Session factory. `autocommit` applies each operation immediately;
/// otherwise operations are buffered until `commit`.
pub trait Database: Send + Sync {
    fn open_session(&self, autocommit: bool) -> Result<Box<dyn DbSession>>;
}
