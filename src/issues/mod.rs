//! Issues: rule findings tied to a component.
//!
//! An issue is either created fresh during a scan (`is_new`) or loaded
//! from storage and mutated (`is_changed`). Persisting an update must
//! not silently overwrite fields an end user changed in storage after
//! the issue was loaded for this scan; that reconciliation lives in the
//! persister.

pub mod cache;
pub mod persister;

pub use cache::IssueCache;
pub use persister::IssuePersister;

use crate::core::Severity;
use crate::persistence::RuleKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub key: String,
    pub user_login: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One recorded change of a single issue field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub rule_key: RuleKey,
    pub component_key: String,
    pub project_key: String,
    pub line: Option<u32>,
    pub message: Option<String>,
    pub severity: Severity,
    /// Severity was set by hand through the web layer and must survive
    /// rescans
    pub manual_severity: bool,
    pub status: String,
    pub resolution: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub author_login: Option<String>,
    pub checksum: Option<String>,
    pub effort_minutes: Option<i64>,
    pub attributes: BTreeMap<String, String>,
    pub comments: Vec<IssueComment>,
    pub changes: Vec<FieldChange>,
    pub creation_date: DateTime<Utc>,
    pub update_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    /// Created fresh by this scan
    pub is_new: bool,
    /// Loaded from storage and mutated by this scan
    pub is_changed: bool,
    /// When this scan loaded the issue from storage; storage writes
    /// after this instant are user edits to be preserved
    pub selected_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(
        key: impl Into<String>,
        rule_key: RuleKey,
        component_key: impl Into<String>,
        project_key: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            rule_key,
            component_key: component_key.into(),
            project_key: project_key.into(),
            line: None,
            message: None,
            severity: Severity::Major,
            manual_severity: false,
            status: "OPEN".to_string(),
            resolution: None,
            assignee: None,
            reporter: None,
            author_login: None,
            checksum: None,
            effort_minutes: None,
            attributes: BTreeMap::new(),
            comments: Vec::new(),
            changes: Vec::new(),
            creation_date: Utc::now(),
            update_date: None,
            close_date: None,
            is_new: true,
            is_changed: false,
            selected_at: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Mark as loaded from storage at `selected_at` and mutated by this
    /// scan
    pub fn changed(mut self, selected_at: DateTime<Utc>) -> Self {
        self.is_new = false;
        self.is_changed = true;
        self.selected_at = Some(selected_at);
        self
    }

    pub fn record_change(
        &mut self,
        field: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.changes.push(FieldChange {
            field: field.into(),
            old_value,
            new_value,
        });
    }
}
