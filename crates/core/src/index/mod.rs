//! Runs every registered metric over every skeleton and folds the results
//! into one [`IndexReport`].

use crate::metrics::Registry;
use classpeek_api::{
    ClassSkeleton, IndexReport, MetricSection, MetricSummary, RUN_SCOPE_ID, Score, UnitFailure,
};
use rayon::prelude::*;
use tracing::{debug, info};

/// Schema location written into every index document.
pub const INDEX_SCHEMA: &str = "xsd/index.xsd";

pub struct Aggregator {
    registry: Registry,
}

impl Aggregator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Scores every `(class, metric)` pair in parallel, then folds them on
    /// the calling thread. Every registered metric gets a section; over an
    /// empty class set that section holds a single sentinel entry.
    pub fn aggregate(&self, skeletons: &[ClassSkeleton], failures: Vec<UnitFailure>) -> IndexReport {
        let mut classes: Vec<&ClassSkeleton> = skeletons.iter().collect();
        classes.sort_by(|a, b| a.id().cmp(b.id()));

        let columns: Vec<Vec<Score>> = self
            .registry
            .as_slice()
            .par_iter()
            .map(|metric| {
                classes
                    .par_iter()
                    .map(|class| metric.score(class, skeletons))
                    .collect()
            })
            .collect();

        let mut sections = Vec::with_capacity(columns.len());
        for (metric, scores) in self.registry.iter().zip(columns) {
            let mut entries: Vec<(String, Score)> = classes
                .iter()
                .map(|class| class.id().to_string())
                .zip(scores)
                .collect();
            if entries.is_empty() {
                entries.push((RUN_SCOPE_ID.to_string(), Score::NotApplicable));
            }
            let summary = MetricSummary::of(entries.iter().map(|(_, score)| score));
            debug!(
                "{}: {} of {} classes applicable",
                metric.name(),
                summary.applicable,
                classes.len()
            );
            sections.push(MetricSection {
                name: metric.name().to_string(),
                entries,
                summary,
            });
        }

        info!(
            "Aggregated {} metrics over {} classes ({} units failed)",
            sections.len(),
            classes.len(),
            failures.len()
        );
        IndexReport::new(INDEX_SCHEMA, sections, failures)
    }
}

/// Convenience over [`Aggregator`] with the given registry.
pub fn aggregate(skeletons: &[ClassSkeleton], registry: Registry) -> IndexReport {
    Aggregator::new(registry).aggregate(skeletons, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::usage::fixtures::*;

    #[test]
    fn test_empty_run_has_every_metric() {
        let registry = Registry::standard();
        let names = registry.names();
        let report = aggregate(&[], registry);
        assert_eq!(report.metrics().len(), names.len());
        for name in names {
            let section = report.metric(name).unwrap();
            assert_eq!(
                section.entries,
                vec![(RUN_SCOPE_ID.to_string(), Score::NotApplicable)]
            );
            assert_eq!(section.summary.applicable, 0);
        }
        assert_eq!(report.schema(), INDEX_SCHEMA);
    }

    #[test]
    fn test_entries_sorted_and_deterministic() {
        let b = ClassSkeleton::new("z.B", vec![field("a")], vec![getter("get", "a")]).unwrap();
        let a = ClassSkeleton::new("a.A", vec![], vec![]).unwrap();
        let skeletons = vec![b, a];

        let first = aggregate(&skeletons, Registry::standard());
        let second = aggregate(&skeletons, Registry::standard());
        assert_eq!(first, second);

        let lcom = first.metric("LCOM").unwrap();
        let ids: Vec<&str> = lcom.entries.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a.A", "z.B"]);
        assert_eq!(first.score("a.A", "LCOM"), Some(Score::NotApplicable));
        assert_eq!(first.score("z.B", "LCOM"), Some(Score::Value(0.0)));
        assert_eq!(first.scores().count(), 2 * Registry::standard().len());
    }
}
