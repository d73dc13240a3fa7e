use serde::{Deserialize, Serialize};
use std::fmt;

/// Class id used for entries that are not tied to a single class: the
/// sentinel row of a metric over an empty run.
pub const RUN_SCOPE_ID: &str = "*";

/// Outcome of one calculator over one class.
///
/// `NotApplicable` is the sentinel for an unmet precondition (for example
/// a ratio with a zero denominator). It is serialized as `NaN`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Score {
    Value(f64),
    NotApplicable,
}

impl Score {
    pub fn value(self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(v),
            Score::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, Score::Value(_))
    }

    /// Ratio helper: `NotApplicable` when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Score::NotApplicable
        } else {
            Score::Value(numerator / denominator)
        }
    }

    pub fn from_count(count: usize) -> Self {
        Score::Value(count as f64)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) => write_number(f, *v),
            Score::NotApplicable => f.write_str("NaN"),
        }
    }
}

/// Shortest text that reads back to the same `f64`, spelled as `xs:double`.
fn write_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "INF" } else { "-INF" })
    } else {
        write!(f, "{v}")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricScore {
    pub class_id: String,
    pub metric: String,
    pub score: Score,
}

/// Statistics over the applicable scores of one metric.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub min: Score,
    pub max: Score,
    pub mean: Score,
    pub applicable: usize,
}

impl MetricSummary {
    pub fn of<'a>(scores: impl IntoIterator<Item = &'a Score>) -> Self {
        let values: Vec<f64> = scores.into_iter().filter_map(|s| s.value()).collect();
        if values.is_empty() {
            return Self {
                min: Score::NotApplicable,
                max: Score::NotApplicable,
                mean: Score::NotApplicable,
                applicable: 0,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = values.iter().sum();
        Self {
            min: Score::Value(min),
            max: Score::Value(max),
            mean: Score::Value(sum / values.len() as f64),
            applicable: values.len(),
        }
    }
}

/// All entries of one metric, classes sorted by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricSection {
    pub name: String,
    pub entries: Vec<(String, Score)>,
    pub summary: MetricSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub unit: String,
    pub reason: String,
}

/// The aggregated result of one run. Built once, never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexReport {
    schema: String,
    metrics: Vec<MetricSection>,
    failures: Vec<UnitFailure>,
}

impl IndexReport {
    pub fn new(
        schema: impl Into<String>,
        metrics: Vec<MetricSection>,
        failures: Vec<UnitFailure>,
    ) -> Self {
        Self {
            schema: schema.into(),
            metrics,
            failures,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn metrics(&self) -> &[MetricSection] {
        &self.metrics
    }

    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }

    pub fn metric(&self, name: &str) -> Option<&MetricSection> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn score(&self, class_id: &str, metric: &str) -> Option<Score> {
        self.metric(metric)?
            .entries
            .iter()
            .find(|(id, _)| id == class_id)
            .map(|(_, score)| *score)
    }

    /// Flattened `(classId, metricName, value)` triples in report order.
    pub fn scores(&self) -> impl Iterator<Item = MetricScore> + '_ {
        self.metrics.iter().flat_map(|section| {
            section.entries.iter().map(move |(class_id, score)| MetricScore {
                class_id: class_id.clone(),
                metric: section.name.clone(),
                score: *score,
            })
        })
    }
}
