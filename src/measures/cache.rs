//! Project-scoped write-back cache for measures.
//!
//! Shared by every module child-scope so that parent-aggregation
//! decorators can read child-module measures. Keyed by (effective
//! component key, discriminator); for plain measures the discriminator
//! is the metric key, rule and person measures add the rule key and
//! person id so a scoped measure never collides with the plain one.

use crate::measures::Measure;

#[derive(Debug, Clone, Default)]
pub struct MeasureCache {
    entries: im::HashMap<(String, String), Measure>,
}

impl MeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn discriminator(measure: &Measure) -> String {
        let mut discriminator = measure.metric_key.clone();
        if let Some(rule_key) = &measure.rule_key {
            discriminator.push('|');
            discriminator.push_str(&rule_key.to_string());
        }
        if let Some(person_id) = measure.person_id {
            discriminator.push_str("|person=");
            discriminator.push_str(&person_id.to_string());
        }
        discriminator
    }

    /// Insert or overwrite: last write wins within a scan
    pub fn put(&mut self, component_key: &str, measure: Measure) {
        self.entries.insert(
            (component_key.to_string(), Self::discriminator(&measure)),
            measure,
        );
    }

    /// Snapshot of all entries, ordered by key for deterministic
    /// iteration; safe to walk while new writes happen elsewhere
    pub fn entries(&self) -> Vec<(String, Measure)> {
        let mut entries: Vec<((String, String), Measure)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|((component, _), measure)| (component, measure))
            .collect()
    }

    /// All measures of one component, ordered by discriminator
    pub fn by_component(&self, component_key: &str) -> Vec<Measure> {
        let mut matching: Vec<(String, Measure)> = self
            .entries
            .iter()
            .filter(|((component, _), _)| component == component_key)
            .map(|((_, discriminator), measure)| (discriminator.clone(), measure.clone()))
            .collect();
        matching.sort_by(|a, b| a.0.cmp(&b.0));
        matching.into_iter().map(|(_, m)| m).collect()
    }

    /// The plain (non-rule) measure of a component for a metric
    pub fn peek(&self, component_key: &str, metric_key: &str) -> Option<Measure> {
        self.entries
            .get(&(component_key.to_string(), metric_key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::persistence::RuleKey;

    #[test]
    fn test_last_write_wins() {
        let mut cache = MeasureCache::new();
        cache.put("a", Measure::new("ncloc").with_value(10.0));
        cache.put("a", Measure::new("ncloc").with_value(20.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek("a", "ncloc").unwrap().value, Some(20.0));
    }

    #[test]
    fn test_rule_measures_do_not_collide_with_plain_ones() {
        let mut cache = MeasureCache::new();
        cache.put("a", Measure::new("violations").with_value(3.0));
        cache.put(
            "a",
            Measure::new("violations")
                .with_value(1.0)
                .with_rule(RuleKey::of("squid", "S001"), Severity::Major),
        );
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek("a", "violations").unwrap().value, Some(3.0));
    }

    #[test]
    fn test_person_measures_do_not_collide_with_plain_ones() {
        let mut cache = MeasureCache::new();
        cache.put("a", Measure::new("ncloc").with_value(100.0));
        let mut personal = Measure::new("ncloc").with_value(12.0);
        personal.person_id = Some(42);
        cache.put("a", personal);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek("a", "ncloc").unwrap().value, Some(100.0));
    }

    #[test]
    fn test_entries_snapshot_is_ordered_and_detached() {
        let mut cache = MeasureCache::new();
        cache.put("b", Measure::new("lines").with_value(2.0));
        cache.put("a", Measure::new("lines").with_value(1.0));
        let snapshot = cache.entries();
        cache.put("c", Measure::new("lines").with_value(3.0));

        let keys: Vec<&str> = snapshot.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_by_component() {
        let mut cache = MeasureCache::new();
        cache.put("a", Measure::new("lines").with_value(1.0));
        cache.put("a", Measure::new("ncloc").with_value(2.0));
        cache.put("b", Measure::new("lines").with_value(3.0));
        assert_eq!(cache.by_component("a").len(), 2);
        assert_eq!(cache.by_component("missing").len(), 0);
    }
}
