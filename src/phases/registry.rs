//! Extension points executed during module phases.
//!
//! Sensors produce raw measures and issues, decorators derive and
//! aggregate on top of them, post-jobs run once everything is computed.
//! Decorators declare the metrics they provide and depend on; the
//! registry resolves a stable execution order from those declarations,
//! keeping registration order among unconstrained decorators.

use crate::config::Settings;
use crate::core::{Error, Result};
use crate::issues::{Issue, IssueCache};
use crate::measures::{Measure, MeasureCache, MetricRegistry};
use crate::scan::filesystem::ModuleFileSystem;
use crate::scan::reactor::ModuleDefinition;
use parking_lot::Mutex;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything an extension may touch while a module is scanned
pub struct SensorContext<'a> {
    definition: &'a ModuleDefinition,
    fs: &'a ModuleFileSystem,
    settings: &'a Settings,
    metrics: &'a MetricRegistry,
    measures: Arc<Mutex<MeasureCache>>,
    issues: Arc<Mutex<IssueCache>>,
}

impl<'a> SensorContext<'a> {
    pub fn new(
        definition: &'a ModuleDefinition,
        fs: &'a ModuleFileSystem,
        settings: &'a Settings,
        metrics: &'a MetricRegistry,
        measures: Arc<Mutex<MeasureCache>>,
        issues: Arc<Mutex<IssueCache>>,
    ) -> Self {
        Self {
            definition,
            fs,
            settings,
            metrics,
            measures,
            issues,
        }
    }

    pub fn definition(&self) -> &ModuleDefinition {
        self.definition
    }

    pub fn fs(&self) -> &ModuleFileSystem {
        self.fs
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Component key of the module being scanned
    pub fn module_component_key(&self) -> &str {
        &self.definition.key
    }

    /// Store a measure, flagging it as best-value when it matches the
    /// metric's canonical default
    pub fn save_measure(&self, component_key: &str, measure: Measure) {
        let measure = match self.metrics.get(&measure.metric_key) {
            Some(metric) => measure.mark_best_value(metric),
            None => measure,
        };
        self.measures.lock().put(component_key, measure);
    }

    pub fn save_issue(&self, issue: Issue) {
        self.issues.lock().put(issue);
    }

    /// The plain measure of a component for a metric, if any extension
    /// saved one so far
    pub fn measure(&self, component_key: &str, metric_key: &str) -> Option<Measure> {
        self.measures.lock().peek(component_key, metric_key)
    }

    pub fn measures_for(&self, component_key: &str) -> Vec<Measure> {
        self.measures.lock().by_component(component_key)
    }

    /// Issues raised so far on the module or any of its files
    pub fn module_issue_count(&self) -> usize {
        let module_key = self.module_component_key();
        let file_prefix = format!("{}:", module_key);
        self.issues
            .lock()
            .entries()
            .iter()
            .filter(|issue| {
                issue.component_key == module_key
                    || issue.component_key.starts_with(&file_prefix)
            })
            .count()
    }
}

pub trait Sensor {
    fn name(&self) -> &str;

    /// Whether the sensor applies to this module; `false` skips it
    /// without error
    fn should_execute(&self, _definition: &ModuleDefinition) -> bool {
        true
    }

    fn execute(&self, context: &SensorContext) -> Result<()>;
}

pub trait Decorator {
    fn name(&self) -> &str;

    /// Metric keys this decorator computes
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }

    /// Metric keys that must be computed before this decorator runs
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    fn should_execute(&self, _definition: &ModuleDefinition) -> bool {
        true
    }

    fn decorate(&self, context: &SensorContext) -> Result<()>;
}

pub trait PostJob {
    fn name(&self) -> &str;

    fn execute(&self, context: &SensorContext) -> Result<()>;
}

/// Registered extensions of a scan, shared by all modules
#[derive(Default)]
pub struct ExtensionRegistry {
    sensors: Vec<Box<dyn Sensor>>,
    decorators: Vec<Box<dyn Decorator>>,
    post_jobs: Vec<Box<dyn PostJob>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sensor(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.push(sensor);
    }

    pub fn register_decorator(&mut self, decorator: Box<dyn Decorator>) {
        self.decorators.push(decorator);
    }

    pub fn register_post_job(&mut self, post_job: Box<dyn PostJob>) {
        self.post_jobs.push(post_job);
    }

    pub fn sensors(&self) -> &[Box<dyn Sensor>] {
        &self.sensors
    }

    pub fn post_jobs(&self) -> &[Box<dyn PostJob>] {
        &self.post_jobs
    }

    /// Decorators sorted so that providers of a metric run before its
    /// dependers. Ties keep registration order. A dependency cycle is a
    /// fatal configuration problem.
    pub fn ordered_decorators(&self) -> Result<Vec<&dyn Decorator>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.decorators.len())
            .map(|i| graph.add_node(i))
            .collect();

        let mut providers: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, decorator) in self.decorators.iter().enumerate() {
            for metric in decorator.provides() {
                providers.entry(metric).or_default().push(i);
            }
        }
        for (i, decorator) in self.decorators.iter().enumerate() {
            for metric in decorator.depends_on() {
                for &provider in providers.get(&metric).map(Vec::as_slice).unwrap_or(&[]) {
                    // a decorator may refine a metric it also provides
                    if provider != i {
                        graph.add_edge(nodes[provider], nodes[i], ());
                    }
                }
            }
        }

        let mut indegree: Vec<usize> = nodes
            .iter()
            .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ordered = Vec::with_capacity(self.decorators.len());
        let mut placed = vec![false; self.decorators.len()];

        while ordered.len() < self.decorators.len() {
            let next = (0..self.decorators.len())
                .find(|&i| !placed[i] && indegree[i] == 0)
                .ok_or_else(|| {
                    Error::phase("decorators", "Cyclic dependency between decorators")
                })?;
            placed[next] = true;
            ordered.push(self.decorators[next].as_ref());
            for neighbor in graph.neighbors_directed(nodes[next], Direction::Outgoing) {
                indegree[graph[neighbor]] -= 1;
            }
        }
        Ok(ordered)
    }
}
