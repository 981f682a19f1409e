//! End-of-scan flush of the measure cache.
//!
//! Persistence is elided for measures that carry no information: memory
//! only modes, empty measures, and best-value measures on file-level
//! components whose variations are all absent or zero. The decision is a
//! pure function so it can be tested without storage. All rows go
//! through one transactional session committed at the end.

use crate::core::{Error, Result};
use crate::index::resource::{Resource, ResourceCache, SnapshotCache};
use crate::index::ScanPersister;
use crate::measures::{Measure, MeasureCache, MetricRegistry};
use crate::persistence::{Database, MeasureRow, RuleFinder};
use parking_lot::Mutex;
use std::sync::Arc;

/// A measure is stored when its mode targets the database, it carries a
/// value, and it is not an elidable best-value measure on a file
pub fn should_persist_measure(resource: &Resource, measure: &Measure) -> bool {
    measure.persistence_mode.use_database()
        && !(resource.qualifier.is_entity() && measure.is_elidable_best_value())
        && !measure.is_empty()
}

pub struct MeasurePersister {
    db: Arc<dyn Database>,
    metrics: MetricRegistry,
    rule_finder: Arc<dyn RuleFinder>,
    measure_cache: Arc<Mutex<MeasureCache>>,
    resources: Arc<Mutex<ResourceCache>>,
    snapshots: Arc<Mutex<SnapshotCache>>,
}

impl MeasurePersister {
    pub fn new(
        db: Arc<dyn Database>,
        metrics: MetricRegistry,
        rule_finder: Arc<dyn RuleFinder>,
        measure_cache: Arc<Mutex<MeasureCache>>,
        resources: Arc<Mutex<ResourceCache>>,
        snapshots: Arc<Mutex<SnapshotCache>>,
    ) -> Self {
        Self {
            db,
            metrics,
            rule_finder,
            measure_cache,
            resources,
            snapshots,
        }
    }

    fn to_row(&self, component_key: &str, measure: &Measure) -> Result<MeasureRow> {
        let context = || {
            format!(
                "Unable to save measure for metric [{}] on component [{}]",
                measure.metric_key, component_key
            )
        };
        let metric = self
            .metrics
            .get(&measure.metric_key)
            .ok_or_else(|| Error::persistence(context(), "unknown metric"))?;
        let snapshot_id = self
            .snapshots
            .lock()
            .get(component_key)
            .and_then(|s| s.id)
            .ok_or_else(|| Error::persistence(context(), "the component was never indexed"))?;

        let rule_id = match &measure.rule_key {
            Some(rule_key) => Some(
                self.rule_finder
                    .find_by_key(rule_key)
                    .ok_or_else(|| {
                        Error::persistence(
                            context(),
                            format!("Can not save a measure with unknown rule {}", rule_key),
                        )
                    })?
                    .id,
            ),
            None => None,
        };

        Ok(MeasureRow {
            snapshot_id,
            metric_id: metric.id,
            value: measure.value,
            data: measure.data.clone(),
            description: measure.description.clone(),
            alert_status: measure.alert_status.clone(),
            alert_text: measure.alert_text.clone(),
            tendency: measure.tendency,
            url: measure.url.clone(),
            variations: measure.variations,
            characteristic_id: measure.characteristic_id,
            person_id: measure.person_id,
            rule_id,
            rule_priority: measure.severity,
        })
    }
}

impl ScanPersister for MeasurePersister {
    fn persist(&self) -> Result<()> {
        let mut session = self.db.open_session(false)?;
        let entries = self.measure_cache.lock().entries();

        for (component_key, measure) in &entries {
            let resource = self.resources.lock().get(component_key).cloned();
            let Some(resource) = resource else {
                // no resource, nothing to attach the measure to
                log::debug!(
                    "Skipping measure for metric [{}] on unregistered component [{}]",
                    measure.metric_key,
                    component_key
                );
                continue;
            };
            if !should_persist_measure(&resource, measure) {
                continue;
            }
            let row = self.to_row(component_key, measure)?;
            session.insert_measure(row)?;
        }

        session.commit()
    }

    fn name(&self) -> &'static str {
        "measures"
    }
}
