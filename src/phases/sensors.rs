//! Stock sensors.

use crate::core::{Error, FileType, Result};
use crate::measures::Measure;
use crate::phases::registry::{Sensor, SensorContext};
use crate::scan::filesystem::FilePredicate;
use crate::scan::reactor::ModuleDefinition;

/// Counts physical and non-blank lines per main file and totals them on
/// the module
pub struct LineCountSensor;

impl Sensor for LineCountSensor {
    fn name(&self) -> &str {
        "line counting"
    }

    fn should_execute(&self, definition: &ModuleDefinition) -> bool {
        !definition.is_aggregator()
    }

    fn execute(&self, context: &SensorContext) -> Result<()> {
        let predicate = FilePredicate::has_type(FileType::Main);
        let mut total_lines = 0usize;
        let mut total_ncloc = 0usize;
        let mut file_count = 0usize;

        for file in context.fs().input_files(&predicate) {
            let Some(key) = file.key() else { continue };
            let content = std::fs::read(file.absolute_path())
                .map_err(|e| Error::indexing(file.absolute_path(), e.to_string()))?;
            let content = String::from_utf8_lossy(&content);
            let lines = file.lines();
            let ncloc = content.lines().filter(|l| !l.trim().is_empty()).count();

            context.save_measure(key, Measure::new("lines").with_value(lines as f64));
            context.save_measure(key, Measure::new("ncloc").with_value(ncloc as f64));

            total_lines += lines;
            total_ncloc += ncloc;
            file_count += 1;
        }

        let module_key = context.module_component_key();
        context.save_measure(module_key, Measure::new("files").with_value(file_count as f64));
        context.save_measure(module_key, Measure::new("lines").with_value(total_lines as f64));
        context.save_measure(module_key, Measure::new("ncloc").with_value(total_ncloc as f64));
        Ok(())
    }
}
