//! Project-scoped write-back cache for issues, keyed by (component key,
//! issue key). Last write wins; `entries()` returns a detached snapshot
//! for the end-of-scan flush.

use crate::issues::Issue;

#[derive(Debug, Clone, Default)]
pub struct IssueCache {
    entries: im::HashMap<(String, String), Issue>,
}

impl IssueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, issue: Issue) {
        self.entries
            .insert((issue.component_key.clone(), issue.key.clone()), issue);
    }

    /// Snapshot of all issues, ordered by (component key, issue key)
    pub fn entries(&self) -> Vec<Issue> {
        let mut entries: Vec<((String, String), Issue)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, issue)| issue).collect()
    }

    pub fn by_component(&self, component_key: &str) -> Vec<Issue> {
        self.entries()
            .into_iter()
            .filter(|issue| issue.component_key == component_key)
            .collect()
    }

    pub fn get(&self, component_key: &str, issue_key: &str) -> Option<Issue> {
        self.entries
            .get(&(component_key.to_string(), issue_key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
