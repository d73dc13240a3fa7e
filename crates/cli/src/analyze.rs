use classpeek_core::{AnalyzeConfig, analyze};
use std::path::PathBuf;
use tracing::{info, warn};

pub fn run(
    input: PathBuf,
    output: PathBuf,
    threads: Option<usize>,
    write_skeletons: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AnalyzeConfig {
        threads,
        write_skeletons,
        ..AnalyzeConfig::new(input, output)
    };

    let summary = analyze(&config)?;

    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    info!("Analysis complete!");
    info!("Units: {}", summary.units);
    info!("Classes: {}", summary.classes);
    info!("Index: {}", summary.index.display());
    for failure in &summary.failures {
        warn!(" - {}: {}", failure.unit, failure.reason);
    }
    Ok(())
}
