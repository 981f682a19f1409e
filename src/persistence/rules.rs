//! Rule lookup: resolve a rule key to its persisted numeric id. Absence
//! is a fatal error when persisting a rule-scoped measure or a new issue.

use crate::core::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Key of a rule: repository plus rule identifier, rendered `repo:rule`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub repository: String,
    pub rule: String,
}

impl RuleKey {
    pub fn of(repository: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            rule: rule.into(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.rule)
    }
}

/// A persisted rule with its storage id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub key: RuleKey,
    pub name: String,
    pub severity: Severity,
}

pub trait RuleFinder: Send + Sync {
    fn find_by_key(&self, key: &RuleKey) -> Option<Rule>;
}

/// Rule registry resolved once at startup
#[derive(Debug, Default)]
pub struct StaticRuleFinder {
    rules: HashMap<RuleKey, Rule>,
}

impl StaticRuleFinder {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.key.clone(), r)).collect(),
        }
    }
}

impl RuleFinder for StaticRuleFinder {
    fn find_by_key(&self, key: &RuleKey) -> Option<Rule> {
        self.rules.get(key).cloned()
    }
}
