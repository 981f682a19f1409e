use batchscan::core::Severity;
use batchscan::issues::{Issue, IssueCache, IssuePersister};
use batchscan::index::ScanPersister;
use batchscan::persistence::{IssueRow, MemoryDatabase, Rule, RuleKey, StaticRuleFinder};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;

fn rule_finder() -> Arc<StaticRuleFinder> {
    Arc::new(StaticRuleFinder::new(vec![Rule {
        id: 7,
        key: RuleKey::of("squid", "S001"),
        name: "rule".to_string(),
        severity: Severity::Major,
    }]))
}

fn persister(db: &MemoryDatabase, cache: Arc<Mutex<IssueCache>>) -> IssuePersister {
    IssuePersister::new(Arc::new(db.clone()), rule_finder(), cache)
}

fn stored_row(key: &str, updated_at: chrono::DateTime<chrono::Utc>) -> IssueRow {
    IssueRow {
        key: key.to_string(),
        rule_id: 7,
        component_key: "p:src/a.rs".to_string(),
        project_key: "p".to_string(),
        line: Some(10),
        message: Some("old message".to_string()),
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

#[test]
fn test_new_issues_are_inserted() {
    let db = MemoryDatabase::new();
    let cache = Arc::new(Mutex::new(IssueCache::new()));
    cache.lock().put(
        Issue::new("NEW-1", RuleKey::of("squid", "S001"), "p:src/a.rs", "p")
            .with_line(3)
            .with_message("something is wrong"),
    );

    persister(&db, cache).persist().unwrap();

    let stored = db.issue("NEW-1").unwrap();
    assert_eq!(stored.rule_id, 7);
    assert_eq!(stored.line, Some(3));
    assert_eq!(stored.status, "OPEN");
}

#[test]
fn test_concurrent_user_edit_wins_on_user_owned_fields() {
    let db = MemoryDatabase::new();
    let selected_at = Utc::now() - Duration::hours(2);
    // the user edited the issue one hour after the scan loaded it
    db.seed_issue(stored_row("K1", Utc::now() - Duration::hours(1)));

    let cache = Arc::new(Mutex::new(IssueCache::new()));
    cache.lock().put(
        Issue::new("K1", RuleKey::of("squid", "S001"), "p:src/a.rs", "p")
            .with_line(42)
            .with_message("recomputed message")
            .with_checksum("BBBB")
            .changed(selected_at),
    );

    persister(&db, cache).persist().unwrap();

    let merged = db.issue("K1").unwrap();
    assert_eq!(merged.assignee.as_deref(), Some("alice"));
    assert_eq!(merged.resolution.as_deref(), Some("FALSE-POSITIVE"));
    assert_eq!(merged.status, "CONFIRMED");
    assert_eq!(merged.severity, Severity::Blocker);
    assert!(merged.manual_severity);
    // scan-owned fields still take the recomputed values
    assert_eq!(merged.line, Some(42));
    assert_eq!(merged.message.as_deref(), Some("recomputed message"));
    assert_eq!(merged.checksum.as_deref(), Some("BBBB"));
}

#[test]
fn test_untouched_storage_takes_all_scan_values() {
    let db = MemoryDatabase::new();
    let selected_at = Utc::now();
    db.seed_issue(stored_row("K1", selected_at - Duration::days(3)));

    let cache = Arc::new(Mutex::new(IssueCache::new()));
    cache.lock().put(
        Issue::new("K1", RuleKey::of("squid", "S001"), "p:src/a.rs", "p")
            .with_line(42)
            .changed(selected_at),
    );

    persister(&db, cache).persist().unwrap();

    let updated = db.issue("K1").unwrap();
    assert_eq!(updated.status, "OPEN");
    assert_eq!(updated.assignee, None);
    assert_eq!(updated.resolution, None);
    assert_eq!(updated.line, Some(42));
}

#[test]
fn test_unknown_rule_aborts_without_partial_flush() {
    let db = MemoryDatabase::new();
    let cache = Arc::new(Mutex::new(IssueCache::new()));
    cache.lock().put(Issue::new(
        "GOOD",
        RuleKey::of("squid", "S001"),
        "p:src/a.rs",
        "p",
    ));
    cache.lock().put(Issue::new(
        "BAD",
        RuleKey::of("squid", "Missing"),
        "p:src/z.rs",
        "p",
    ));

    let err = persister(&db, cache).persist().unwrap_err();
    assert!(err.to_string().contains("unknown rule"));
    assert!(db.issues().is_empty());
}

#[test]
fn test_unchanged_loaded_issues_are_left_alone() {
    let db = MemoryDatabase::new();
    db.seed_issue(stored_row("K1", Utc::now()));

    let cache = Arc::new(Mutex::new(IssueCache::new()));
    let mut loaded = Issue::new("K1", RuleKey::of("squid", "S001"), "p:src/a.rs", "p");
    loaded.is_new = false;
    cache.lock().put(loaded);

    persister(&db, cache).persist().unwrap();

    let untouched = db.issue("K1").unwrap();
    assert_eq!(untouched.message.as_deref(), Some("old message"));
    assert_eq!(untouched.line, Some(10));
}
