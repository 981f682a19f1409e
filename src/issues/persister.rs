//! End-of-scan flush of the issue cache.
//!
//! New issues are inserted; changed issues are updated with optimistic
//! conflict resolution: fields an end user edited in storage after this
//! scan loaded the issue (assignee, resolution, status, manually-set
//! severity) keep their stored value, while scan-owned fields (line,
//! message, checksum, effort, attributes) always take the scan's value.
//! The merge is a designed recovery, not an error path. Everything goes
//! through one transactional session committed at the end, so a failure
//! leaves no partial flush behind.

use crate::core::{Error, Result};
use crate::index::ScanPersister;
use crate::issues::{Issue, IssueCache};
use crate::persistence::{Database, IssueRow, RuleFinder};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct IssuePersister {
    db: Arc<dyn Database>,
    rule_finder: Arc<dyn RuleFinder>,
    issue_cache: Arc<Mutex<IssueCache>>,
}

impl IssuePersister {
    pub fn new(
        db: Arc<dyn Database>,
        rule_finder: Arc<dyn RuleFinder>,
        issue_cache: Arc<Mutex<IssueCache>>,
    ) -> Self {
        Self {
            db,
            rule_finder,
            issue_cache,
        }
    }

    fn to_row(&self, issue: &Issue) -> Result<IssueRow> {
        let rule = self.rule_finder.find_by_key(&issue.rule_key).ok_or_else(|| {
            Error::persistence(
                format!(
                    "issue [{}] on component [{}]",
                    issue.key, issue.component_key
                ),
                format!("unknown rule {}", issue.rule_key),
            )
        })?;
        Ok(IssueRow {
            key: issue.key.clone(),
            rule_id: rule.id,
            component_key: issue.component_key.clone(),
            project_key: issue.project_key.clone(),
            line: issue.line,
            message: issue.message.clone(),
            severity: issue.severity,
            manual_severity: issue.manual_severity,
            status: issue.status.clone(),
            resolution: issue.resolution.clone(),
            assignee: issue.assignee.clone(),
            reporter: issue.reporter.clone(),
            author_login: issue.author_login.clone(),
            checksum: issue.checksum.clone(),
            effort_minutes: issue.effort_minutes,
            attributes: issue.attributes.clone(),
            creation_date: issue.creation_date,
            update_date: issue.update_date,
            close_date: issue.close_date,
            updated_at: Utc::now(),
        })
    }
}

impl ScanPersister for IssuePersister {
    fn persist(&self) -> Result<()> {
        let mut session = self.db.open_session(false)?;
        let issues = self.issue_cache.lock().entries();

        for issue in issues {
            if issue.is_new {
                let row = self.to_row(&issue)?;
                session.insert_issue(row)?;
            } else if issue.is_changed {
                let stored = session.select_issue(&issue.key)?.ok_or_else(|| {
                    Error::persistence(
                        format!("issue [{}]", issue.key),
                        "the issue was loaded for this scan but is gone from storage",
                    )
                })?;
                let row = merge(&issue, &stored, self.to_row(&issue)?);
                session.update_issue(row)?;
            }
        }

        session.commit()
    }

    fn name(&self) -> &'static str {
        "issues"
    }
}

/// Reconcile a scan-computed update against the stored row. `scan_row`
/// already carries the scan values; user-owned fields are rolled back to
/// the stored values when storage was written after the scan loaded the
/// issue.
fn merge(issue: &Issue, stored: &IssueRow, mut scan_row: IssueRow) -> IssueRow {
    // Immutable once created, whatever the scan computed
    scan_row.rule_id = stored.rule_id;
    scan_row.component_key = stored.component_key.clone();
    scan_row.project_key = stored.project_key.clone();
    scan_row.creation_date = stored.creation_date;

    let user_edited = issue
        .selected_at
        .map(|selected_at| stored.updated_at > selected_at)
        .unwrap_or(false);
    if user_edited {
        log::debug!(
            "Preserving user-edited fields of issue {} (storage updated after scan load)",
            issue.key
        );
        scan_row.assignee = stored.assignee.clone();
        scan_row.resolution = stored.resolution.clone();
        scan_row.status = stored.status.clone();
        if stored.manual_severity {
            scan_row.severity = stored.severity;
            scan_row.manual_severity = true;
        }
    }
    scan_row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::persistence::RuleKey;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn stored_row(updated_at: chrono::DateTime<chrono::Utc>) -> IssueRow {
        IssueRow {
            key: "ABCDE".to_string(),
            rule_id: 7,
            component_key: "p:src/a.rs".to_string(),
            project_key: "p".to_string(),
            line: Some(10),
            message: Some("old".to_string()),
            severity: Severity::Blocker,
            manual_severity: true,
            status: "CONFIRMED".to_string(),
            resolution: Some("FALSE-POSITIVE".to_string()),
            assignee: Some("alice".to_string()),
            reporter: None,
            author_login: None,
            checksum: Some("AAAA".to_string()),
            effort_minutes: Some(5),
            attributes: BTreeMap::new(),
            creation_date: Utc::now() - Duration::days(30),
            update_date: None,
            close_date: None,
            updated_at,
        }
    }

    fn scan_issue(selected_at: chrono::DateTime<chrono::Utc>) -> Issue {
        Issue::new("ABCDE", RuleKey::of("squid", "S001"), "p:src/a.rs", "p")
            .with_line(42)
            .with_message("new message")
            .with_checksum("BBBB")
            .changed(selected_at)
    }

    fn scan_row(issue: &Issue) -> IssueRow {
        IssueRow {
            key: issue.key.clone(),
            rule_id: 1,
            component_key: issue.component_key.clone(),
            project_key: issue.project_key.clone(),
            line: issue.line,
            message: issue.message.clone(),
            severity: issue.severity,
            manual_severity: issue.manual_severity,
            status: issue.status.clone(),
            resolution: issue.resolution.clone(),
            assignee: issue.assignee.clone(),
            reporter: None,
            author_login: None,
            checksum: issue.checksum.clone(),
            effort_minutes: None,
            attributes: BTreeMap::new(),
            creation_date: issue.creation_date,
            update_date: None,
            close_date: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_preserves_user_edits_made_after_scan_load() {
        let selected_at = Utc::now() - Duration::hours(2);
        let issue = scan_issue(selected_at);
        // storage was written after the scan loaded the issue
        let stored = stored_row(Utc::now() - Duration::hours(1));
        let merged = merge(&issue, &stored, scan_row(&issue));

        assert_eq!(merged.assignee.as_deref(), Some("alice"));
        assert_eq!(merged.resolution.as_deref(), Some("FALSE-POSITIVE"));
        assert_eq!(merged.status, "CONFIRMED");
        assert_eq!(merged.severity, Severity::Blocker);
        assert!(merged.manual_severity);
        // scan-owned fields still move forward
        assert_eq!(merged.line, Some(42));
        assert_eq!(merged.message.as_deref(), Some("new message"));
        assert_eq!(merged.checksum.as_deref(), Some("BBBB"));
        // immutable fields come from storage
        assert_eq!(merged.rule_id, 7);
        assert_eq!(merged.creation_date, stored.creation_date);
    }

    #[test]
    fn test_merge_applies_scan_values_without_user_edit() {
        let selected_at = Utc::now();
        let issue = scan_issue(selected_at);
        // storage untouched since before the load
        let stored = stored_row(selected_at - Duration::hours(5));
        let merged = merge(&issue, &stored, scan_row(&issue));

        assert_eq!(merged.assignee, None);
        assert_eq!(merged.status, "OPEN");
        assert_eq!(merged.resolution, None);
        assert_eq!(merged.line, Some(42));
    }
}
