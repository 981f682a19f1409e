use anyhow::Result;
use batchscan::cli::{Cli, Commands};
use batchscan::persistence::{MemoryDatabase, StaticRuleFinder};
use batchscan::phases::default_registry;
use batchscan::scan::reactor::ProjectReactor;
use batchscan::{ProjectConfig, ProjectScope};
use clap::Parser;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            project,
            no_import_sources,
        } => {
            let mut config = ProjectConfig::load(&project)?;
            if no_import_sources {
                config.settings.import_sources = false;
            }
            let reactor = ProjectReactor::new(config.project)?;

            let scope = ProjectScope::new(
                config.settings,
                reactor,
                Arc::new(MemoryDatabase::new()),
                Arc::new(StaticRuleFinder::default()),
            )
            .with_registry(default_registry());

            let summary = scope.scan()?;
            println!(
                "Scanned {} module(s), indexed {} file(s), {} measure(s), {} issue(s)",
                summary.modules_scanned,
                summary.files_indexed,
                summary.measures,
                summary.issues
            );
            Ok(())
        }
    }
}
