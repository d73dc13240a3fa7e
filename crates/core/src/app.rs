//! Directory-level entry point: discover class files, build, aggregate and
//! write every document.

use crate::error::{ClasspeekError, Result};
use crate::index::Aggregator;
use crate::metrics::Registry;
use crate::schema::{self, SCHEMA_FILES};
use crate::skeleton::{self, RawUnit};
use crate::xml;
use classpeek_api::{ClassSkeleton, IndexReport, UnitFailure};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const CLASS_EXTENSION: &str = "class";

#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Write `skeletons/<ClassId>.xml` for every unit.
    pub write_skeletons: bool,
}

impl AnalyzeConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            threads: None,
            write_skeletons: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub units: usize,
    pub classes: usize,
    pub metrics: Vec<String>,
    pub failures: Vec<UnitFailure>,
    pub skeleton: PathBuf,
    pub skeletons: Option<PathBuf>,
    pub index: PathBuf,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Analyzes every `*.class` file under `config.input` and writes the
/// skeleton, index and schema files under `config.output`.
pub fn analyze(config: &AnalyzeConfig) -> Result<RunSummary> {
    match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ClasspeekError::Internal(format!("thread pool: {e}")))?;
            pool.install(|| run(config))
        }
        None => run(config),
    }
}

fn run(config: &AnalyzeConfig) -> Result<RunSummary> {
    if !config.input.is_dir() {
        return Err(ClasspeekError::MissingInput(config.input.clone()));
    }
    info!("Analyzing class files under {}", config.input.display());

    let files = discover(&config.input);
    let unit_count = files.len();
    let (units, mut failures) = read_units(&config.input, files);

    let outcome = skeleton::build_all(units)?;
    failures.extend(outcome.failures);
    failures.sort_by(|a, b| a.unit.cmp(&b.unit));
    let mut skeletons = outcome.skeletons;
    skeletons.sort_by(|a, b| a.id().cmp(b.id()));

    let aggregator = Aggregator::new(Registry::standard());
    let metrics = aggregator
        .registry()
        .names()
        .into_iter()
        .map(String::from)
        .collect();
    let report = aggregator.aggregate(&skeletons, failures);

    let written = write_outputs(config, &skeletons, &report)?;
    info!(
        "Analyzed {} classes from {} units, {} failed",
        skeletons.len(),
        unit_count,
        report.failures().len()
    );
    Ok(RunSummary {
        units: unit_count,
        classes: skeletons.len(),
        metrics,
        failures: report.failures().to_vec(),
        skeleton: written.skeleton,
        skeletons: written.skeletons,
        index: written.index,
    })
}

/// Every `*.class` file below `root`, in sorted path order.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some(CLASS_EXTENSION))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    debug!("Discovered {} class files", files.len());
    files
}

fn read_units(root: &Path, files: Vec<PathBuf>) -> (Vec<RawUnit>, Vec<UnitFailure>) {
    let results: Vec<(String, std::io::Result<Vec<u8>>)> = files
        .par_iter()
        .map(|path| (unit_label(root, path), fs::read(path)))
        .collect();

    let mut units = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (label, bytes) in results {
        match bytes {
            Ok(bytes) => units.push(RawUnit { label, bytes }),
            Err(e) => {
                warn!("Cannot read {}: {}", label, e);
                failures.push(UnitFailure {
                    unit: label,
                    reason: format!("unreadable: {e}"),
                });
            }
        }
    }
    (units, failures)
}

fn unit_label(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug)]
struct Written {
    skeleton: PathBuf,
    skeletons: Option<PathBuf>,
    index: PathBuf,
}

const SKELETON_FILE: &str = "skeleton.xml";
const INDEX_FILE: &str = "index.xml";
const SKELETONS_DIR: &str = "skeletons";

/// Every output document, keyed by its path relative to the output
/// directory. All of them have passed schema validation.
fn render_outputs(
    skeletons: &[ClassSkeleton],
    report: &IndexReport,
    write_skeletons: bool,
) -> Result<Vec<(PathBuf, String)>> {
    let mut documents: Vec<(PathBuf, String)> = SCHEMA_FILES
        .iter()
        .map(|(relative, contents)| (PathBuf::from(*relative), contents.to_string()))
        .collect();

    let combined = xml::skeleton_document(skeletons)?;
    schema::validate_skeleton(SKELETON_FILE, &combined)?;
    documents.push((PathBuf::from(SKELETON_FILE), combined));

    if write_skeletons {
        let per_class = skeletons
            .par_iter()
            .map(|class| -> Result<(PathBuf, String)> {
                let name = format!("{}.xml", class.id());
                let document = xml::class_document(class)?;
                schema::validate_skeleton(&name, &document)?;
                Ok((Path::new(SKELETONS_DIR).join(name), document))
            })
            .collect::<Result<Vec<_>>>()?;
        documents.extend(per_class);
    }

    let index = xml::index_document(report)?;
    schema::validate_index(INDEX_FILE, &index)?;
    documents.push((PathBuf::from(INDEX_FILE), index));
    Ok(documents)
}

/// Nothing touches the output directory until every document validates.
fn write_outputs(
    config: &AnalyzeConfig,
    skeletons: &[ClassSkeleton],
    report: &IndexReport,
) -> Result<Written> {
    let documents = render_outputs(skeletons, report, config.write_skeletons)?;

    let output = &config.output;
    fs::create_dir_all(output)?;
    documents
        .par_iter()
        .try_for_each(|(relative, contents)| write_document(&output.join(relative), contents))?;

    let skeletons_dir = output.join(SKELETONS_DIR);
    if config.write_skeletons {
        fs::create_dir_all(&skeletons_dir)?;
    }
    Ok(Written {
        skeleton: output.join(SKELETON_FILE),
        skeletons: config.write_skeletons.then_some(skeletons_dir),
        index: output.join(INDEX_FILE),
    })
}

fn write_document(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
