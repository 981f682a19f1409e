//! Stock decorators.

use crate::core::Result;
use crate::measures::Measure;
use crate::phases::registry::{Decorator, SensorContext};
use crate::scan::reactor::ModuleDefinition;
use std::collections::BTreeMap;

/// Stores the module's per-language file distribution as a data measure,
/// e.g. `java=10;rust=5`
pub struct LanguageDistributionDecorator;

impl Decorator for LanguageDistributionDecorator {
    fn name(&self) -> &str {
        "language distribution"
    }

    fn provides(&self) -> Vec<String> {
        vec!["language_distribution".to_string()]
    }

    fn should_execute(&self, definition: &ModuleDefinition) -> bool {
        !definition.is_aggregator()
    }

    fn decorate(&self, context: &SensorContext) -> Result<()> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for file in context.fs().catalog().files() {
            if let Some(language) = file.language() {
                *counts.entry(language.to_string()).or_default() += 1;
            }
        }
        if counts.is_empty() {
            return Ok(());
        }
        let data = counts
            .iter()
            .map(|(language, count)| format!("{}={}", language, count))
            .collect::<Vec<_>>()
            .join(";");
        context.save_measure(
            context.module_component_key(),
            Measure::new("language_distribution").with_data(data),
        );
        Ok(())
    }
}

/// Rolls child-module size totals up onto the parent module
pub struct SizeAggregationDecorator;

impl SizeAggregationDecorator {
    const METRICS: [&'static str; 3] = ["files", "lines", "ncloc"];
}

impl Decorator for SizeAggregationDecorator {
    fn name(&self) -> &str {
        "size aggregation"
    }

    fn depends_on(&self) -> Vec<String> {
        Self::METRICS.iter().map(|m| m.to_string()).collect()
    }

    fn should_execute(&self, definition: &ModuleDefinition) -> bool {
        !definition.modules.is_empty()
    }

    fn decorate(&self, context: &SensorContext) -> Result<()> {
        let module_key = context.module_component_key();
        for metric in Self::METRICS {
            let own = context
                .measure(module_key, metric)
                .and_then(|m| m.value)
                .unwrap_or(0.0);
            // children were scanned before this module, their totals are
            // already in the cache
            let children: f64 = context
                .definition()
                .modules
                .iter()
                .filter_map(|child| context.measure(&child.key, metric))
                .filter_map(|m| m.value)
                .sum();
            context.save_measure(
                module_key,
                Measure::new(metric).with_value(own + children),
            );
        }
        Ok(())
    }
}
