//! Measures: (component, metric) values produced during phase execution.

pub mod cache;

pub use cache::MeasureCache;

use crate::core::Severity;
use crate::persistence::RuleKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declaration of a metric, resolved once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: i64,
    pub key: String,
    /// Canonical default: measures carrying it may be elided from storage
    pub best_value: Option<f64>,
    /// Whether best-value elision is enabled for this metric
    pub optimized_best_value: bool,
}

impl Metric {
    pub fn new(id: i64, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            best_value: None,
            optimized_best_value: false,
        }
    }

    pub fn with_best_value(mut self, best_value: f64) -> Self {
        self.best_value = Some(best_value);
        self.optimized_best_value = true;
        self
    }
}

/// Metric registry shared by the whole scan
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    by_key: HashMap<String, Metric>,
}

impl MetricRegistry {
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self {
            by_key: metrics.into_iter().map(|m| (m.key.clone(), m)).collect(),
        }
    }

    /// Core metrics every scan knows about
    pub fn defaults() -> Self {
        Self::new(vec![
            Metric::new(1, "lines"),
            Metric::new(2, "ncloc"),
            Metric::new(3, "files"),
            Metric::new(4, "language_distribution"),
            Metric::new(5, "violations").with_best_value(0.0),
            Metric::new(6, "coverage").with_best_value(100.0),
            Metric::new(7, "duplicated_lines_density").with_best_value(0.0),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.by_key.get(key)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Where a measure may live: in storage, in memory only, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceMode {
    Database,
    Memory,
    Full,
}

impl PersistenceMode {
    pub fn use_database(self) -> bool {
        !matches!(self, PersistenceMode::Memory)
    }

    pub fn use_memory(self) -> bool {
        !matches!(self, PersistenceMode::Database)
    }
}

/// A (component, metric) value accumulated during a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub metric_key: String,
    pub value: Option<f64>,
    pub data: Option<String>,
    pub description: Option<String>,
    pub alert_status: Option<String>,
    pub alert_text: Option<String>,
    pub tendency: Option<i32>,
    pub url: Option<String>,
    /// Variation deltas against up to 5 comparison periods
    pub variations: [Option<f64>; 5],
    pub persistence_mode: PersistenceMode,
    /// Value equals the metric's canonical default
    pub best_value: bool,
    pub rule_key: Option<RuleKey>,
    pub severity: Option<Severity>,
    pub characteristic_id: Option<i64>,
    pub person_id: Option<i64>,
}

impl Measure {
    pub fn new(metric_key: impl Into<String>) -> Self {
        Self {
            metric_key: metric_key.into(),
            value: None,
            data: None,
            description: None,
            alert_status: None,
            alert_text: None,
            tendency: None,
            url: None,
            variations: [None; 5],
            persistence_mode: PersistenceMode::Full,
            best_value: false,
            rule_key: None,
            severity: None,
            characteristic_id: None,
            person_id: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the variation for period 1..=5
    pub fn with_variation(mut self, period: usize, variation: f64) -> Self {
        assert!((1..=5).contains(&period), "period must be in 1..=5");
        self.variations[period - 1] = Some(variation);
        self
    }

    pub fn with_persistence_mode(mut self, mode: PersistenceMode) -> Self {
        self.persistence_mode = mode;
        self
    }

    pub fn with_rule(mut self, rule_key: RuleKey, severity: Severity) -> Self {
        self.rule_key = Some(rule_key);
        self.severity = Some(severity);
        self
    }

    /// Flag the measure as best-value when its value matches the
    /// metric's canonical default
    pub fn mark_best_value(mut self, metric: &Metric) -> Self {
        self.best_value = metric.optimized_best_value
            && metric.best_value.is_some()
            && self.value == metric.best_value;
        self
    }

    /// No value, no data, no variation on any period
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.data.is_none() && self.variations.iter().all(Option::is_none)
    }

    /// Best-value measures only stay elidable while every variation is
    /// absent or zero; a real delta must be persisted
    pub fn is_elidable_best_value(&self) -> bool {
        self.best_value
            && self
                .variations
                .iter()
                .all(|v| v.map(|x| x == 0.0).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(Measure::new("ncloc").is_empty());
        assert!(!Measure::new("ncloc").with_value(1.0).is_empty());
        assert!(!Measure::new("ncloc").with_data("x").is_empty());
        assert!(!Measure::new("ncloc").with_variation(3, 1.5).is_empty());
    }

    #[test]
    fn test_mark_best_value() {
        let registry = MetricRegistry::defaults();
        let coverage = registry.get("coverage").unwrap();
        assert!(Measure::new("coverage")
            .with_value(100.0)
            .mark_best_value(coverage)
            .best_value);
        assert!(!Measure::new("coverage")
            .with_value(80.0)
            .mark_best_value(coverage)
            .best_value);
        // lines has no best value at all
        let lines = registry.get("lines").unwrap();
        assert!(!Measure::new("lines")
            .with_value(200.0)
            .mark_best_value(lines)
            .best_value);
    }

    #[test]
    fn test_best_value_elision_stops_on_real_variation() {
        let registry = MetricRegistry::defaults();
        let density = registry.get("duplicated_lines_density").unwrap();
        let measure = Measure::new("duplicated_lines_density")
            .with_value(0.0)
            .mark_best_value(density);
        assert!(measure.is_elidable_best_value());

        let zero_variation = measure.clone().with_variation(1, 0.0);
        assert!(zero_variation.is_elidable_best_value());

        let real_variation = measure.with_variation(1, -3.0);
        assert!(!real_variation.is_elidable_best_value());
    }

    #[test]
    fn test_persistence_mode() {
        assert!(PersistenceMode::Database.use_database());
        assert!(PersistenceMode::Full.use_database());
        assert!(!PersistenceMode::Memory.use_database());
        assert!(!PersistenceMode::Database.use_memory());
    }
}
