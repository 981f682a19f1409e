use batchscan::config::Settings;
use batchscan::persistence::{MemoryDatabase, StaticRuleFinder};
use batchscan::phases::default_registry;
use batchscan::scan::reactor::{ModuleDefinition, ProjectReactor};
use batchscan::ProjectScope;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn write_file(dir: &TempDir, relative: &str, content: &str) {
    let path = dir.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn leaf(key: &str, base_dir: PathBuf) -> ModuleDefinition {
    ModuleDefinition {
        key: key.to_string(),
        name: None,
        base_dir,
        sources: vec![PathBuf::from("src")],
        tests: Vec::new(),
        source_files: Vec::new(),
        test_files: Vec::new(),
        modules: Vec::new(),
    }
}

/// Root with one submodule: root/src/main.rs plus child/src/lib.rs
fn project(dir: &TempDir) -> ProjectReactor {
    write_file(dir, "src/main.rs", "fn main() {}\n");
    write_file(dir, "child/src/lib.rs", "pub fn a() {}\n\n");

    let mut root = leaf("org.example:root", dir.path().to_path_buf());
    root.modules
        .push(leaf("org.example:child", dir.path().join("child")));
    ProjectReactor::new(root).unwrap()
}

fn scan(dir: &TempDir, db: &MemoryDatabase) -> batchscan::ScanSummary {
    ProjectScope::new(
        Settings::default(),
        project(dir),
        Arc::new(db.clone()),
        Arc::new(StaticRuleFinder::default()),
    )
    .with_registry(default_registry())
    .scan()
    .unwrap()
}

#[test]
fn test_scan_walks_the_whole_module_tree() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    let summary = scan(&dir, &db);

    assert_eq!(summary.modules_scanned, 2);
    assert_eq!(summary.files_indexed, 2);
    assert!(summary.measures > 0);
    assert_eq!(summary.issues, 0);
}

#[test]
fn test_resources_are_registered_parent_before_child() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    scan(&dir, &db);

    let project = db.resource_by_key("org.example:root").unwrap();
    let module = db.resource_by_key("org.example:child").unwrap();
    let file = db
        .resource_by_key("org.example:child:src/lib.rs")
        .unwrap();

    assert!(project.id.unwrap() < module.id.unwrap());
    assert!(module.id.unwrap() < file.id.unwrap());
    assert_eq!(module.project_id, project.id);
    assert_eq!(file.project_id, project.id);
    assert_eq!(file.sub_project_id, module.id);
}

#[test]
fn test_parent_measures_aggregate_child_modules() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    scan(&dir, &db);

    let root_snapshot = db.snapshot_id_of("org.example:root").unwrap();
    let rows = db.measures();

    // metric ids from the default registry: lines=1, files=3
    let root_files = rows
        .iter()
        .find(|r| r.snapshot_id == root_snapshot && r.metric_id == 3)
        .unwrap();
    assert_eq!(root_files.value, Some(2.0));

    // root's own line plus the child's two lines
    let root_lines = rows
        .iter()
        .find(|r| r.snapshot_id == root_snapshot && r.metric_id == 1)
        .unwrap();
    assert_eq!(root_lines.value, Some(3.0));
}

#[test]
fn test_sources_are_imported_per_file() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    scan(&dir, &db);

    let snapshot = db.snapshot_id_of("org.example:root:src/main.rs").unwrap();
    assert_eq!(db.source_of(snapshot).as_deref(), Some("fn main() {}\n"));
}

#[test]
fn test_file_hashes_are_stored_for_the_next_pass() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    scan(&dir, &db);

    assert!(db
        .stored_file_hashes("org.example:root")
        .contains_key("src/main.rs"));
    assert!(db
        .stored_file_hashes("org.example:child")
        .contains_key("src/lib.rs"));
}

#[test]
fn test_report_is_written_into_the_root_work_dir() {
    let dir = TempDir::new().unwrap();
    let db = MemoryDatabase::new();
    scan(&dir, &db);

    let report_path = dir.path().join(".batchscan/scan-report.json");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["module"], "org.example:root");
    assert_eq!(report["indexed_files"], 1);
}
