//! Cohesion calculators over built skeletons.
//!
//! The set of metrics is closed: [`Registry::standard`] lists every one of
//! them and the index aggregator runs exactly that list.

pub mod connectivity;
pub mod coupling;
pub mod lcom;
pub mod params;
pub mod usage;

use classpeek_api::{ClassSkeleton, Score};

pub use usage::Usage;

/// A stateless, deterministic calculator.
///
/// `codebase` holds every skeleton of the run (including `class`); only
/// cross-class metrics look at it.
pub trait Metric: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn score(&self, class: &ClassSkeleton, codebase: &[ClassSkeleton]) -> Score;
}

/// Fixed, ordered table of calculators, built once at startup.
pub struct Registry {
    metrics: Vec<Box<dyn Metric>>,
}

impl Registry {
    pub fn standard() -> Self {
        Self {
            metrics: vec![
                Box::new(lcom::Lcom),
                Box::new(lcom::Lcom2),
                Box::new(lcom::Lcom3),
                Box::new(connectivity::Lcom4),
                Box::new(connectivity::Tcc),
                Box::new(connectivity::Lcc),
                Box::new(params::Camc),
                Box::new(params::Nhd),
                Box::new(lcom::Scom),
                Box::new(coupling::Ca),
            ],
        }
    }

    /// Registry over an explicit list, in the given order.
    pub fn with(metrics: Vec<Box<dyn Metric>>) -> Self {
        Self { metrics }
    }

    pub fn as_slice(&self) -> &[Box<dyn Metric>] {
        &self.metrics
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Metric> {
        self.metrics.iter().map(|m| m.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Metric> {
        self.iter().find(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_registry_names_unique() {
        let registry = Registry::standard();
        let names = registry.names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names.first(), Some(&"LCOM"));
        assert!(registry.get("TCC").is_some());
        assert!(registry.get("nope").is_none());
    }
}
