mod analyze;

use clap::{Parser, Subcommand};
use classpeek_core::logging::{LogOptions, init_logging};
use classpeek_core::metrics::Registry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "classpeek",
    version,
    about = "Cohesion metrics for compiled JVM classes",
    long_about = "Classpeek reads compiled class files without running them, extracts a skeleton of \
                  every class (methods, their signatures and the fields and methods they touch) and \
                  scores each class with a fixed set of cohesion metrics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a directory of class files
    #[command(
        long_about = "Walks INPUT for *.class files and writes skeleton.xml, skeletons/<Class>.xml, \
                            index.xml and the schema files under OUTPUT."
    )]
    Analyze {
        /// Directory containing compiled class files
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Directory the documents are written to
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Number of worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,
        /// Skip the per-class skeleton documents
        #[arg(long)]
        no_skeletons: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        /// Only log to the log file
        #[arg(long, short)]
        quiet: bool,
        /// Directory for log files (defaults to ~/.classpeek/logs)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },
    /// List the registered metrics
    Metrics,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            threads,
            no_skeletons,
            json,
            quiet,
            log_dir,
        } => {
            let options = LogOptions {
                to_stderr: !quiet,
                log_dir,
                ..LogOptions::default()
            };
            let _guard = init_logging("analyze", &options);
            analyze::run(input, output, threads, !no_skeletons, json)
        }
        Commands::Metrics => {
            for metric in Registry::standard().iter() {
                println!("{:<6} {}", metric.name(), metric.description());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from([
            "classpeek",
            "analyze",
            "target/classes",
            "out",
            "--threads",
            "4",
            "--no-skeletons",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                input,
                threads,
                no_skeletons,
                json,
                quiet,
                ..
            } => {
                assert_eq!(input, PathBuf::from("target/classes"));
                assert_eq!(threads, Some(4));
                assert!(no_skeletons && json && !quiet);
            }
            Commands::Metrics => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_requires_output() {
        assert!(Cli::try_parse_from(["classpeek", "analyze", "in"]).is_err());
    }
}
