//! Stock post-jobs.

use crate::core::{Error, Result};
use crate::phases::registry::{PostJob, SensorContext};
use serde::Serialize;

#[derive(Serialize)]
struct ReportMeasure {
    metric: String,
    value: Option<f64>,
    data: Option<String>,
}

#[derive(Serialize)]
struct Report {
    module: String,
    indexed_files: usize,
    measures: Vec<ReportMeasure>,
    issues: usize,
}

/// Dumps the module's own measures as JSON into the working directory
pub struct JsonReportPostJob;

impl PostJob for JsonReportPostJob {
    fn name(&self) -> &str {
        "json report"
    }

    fn execute(&self, context: &SensorContext) -> Result<()> {
        let module_key = context.module_component_key();
        let report = Report {
            module: module_key.to_string(),
            indexed_files: context.fs().catalog().len(),
            measures: context
                .measures_for(module_key)
                .into_iter()
                .map(|m| ReportMeasure {
                    metric: m.metric_key,
                    value: m.value,
                    data: m.data,
                })
                .collect(),
            issues: context.module_issue_count(),
        };
        let path = context.fs().work_dir().join("scan-report.json");
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::phase(self.name(), e.to_string()))?;
        std::fs::write(&path, json)?;
        log::info!("Scan report written to {}", path.display());
        Ok(())
    }
}
