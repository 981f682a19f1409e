//! Phase execution for one module: sensors, then decorators in
//! dependency order, then post-jobs. The first failing extension aborts
//! the scan; its name is carried in the error.

pub mod decorators;
pub mod post_jobs;
pub mod registry;
pub mod sensors;

pub use registry::{Decorator, ExtensionRegistry, PostJob, Sensor, SensorContext};

use crate::core::{Error, Result};

/// The stock extensions every scan starts from
pub fn default_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register_sensor(Box::new(sensors::LineCountSensor));
    registry.register_decorator(Box::new(decorators::LanguageDistributionDecorator));
    registry.register_decorator(Box::new(decorators::SizeAggregationDecorator));
    registry.register_post_job(Box::new(post_jobs::JsonReportPostJob));
    registry
}

pub struct PhaseExecutor<'a> {
    registry: &'a ExtensionRegistry,
}

impl<'a> PhaseExecutor<'a> {
    pub fn new(registry: &'a ExtensionRegistry) -> Self {
        Self { registry }
    }

    /// Run all phases on one module. Post-jobs only run on the root
    /// module, after the whole tree has been scanned.
    pub fn execute(&self, context: &SensorContext, is_root: bool) -> Result<()> {
        for sensor in self.registry.sensors() {
            if !sensor.should_execute(context.definition()) {
                continue;
            }
            log::info!("Sensor {}", sensor.name());
            sensor
                .execute(context)
                .map_err(|e| Error::phase(sensor.name(), e.to_string()))?;
        }

        for decorator in self.registry.ordered_decorators()? {
            if !decorator.should_execute(context.definition()) {
                continue;
            }
            log::debug!("Decorator {}", decorator.name());
            decorator
                .decorate(context)
                .map_err(|e| Error::phase(decorator.name(), e.to_string()))?;
        }

        if is_root {
            for post_job in self.registry.post_jobs() {
                log::info!("Post-job {}", post_job.name());
                post_job
                    .execute(context)
                    .map_err(|e| Error::phase(post_job.name(), e.to_string()))?;
            }
        }
        Ok(())
    }
}
