//! Skeleton construction: one immutable [`ClassSkeleton`] per compiled unit.

pub mod builder;
pub mod synthetic;

pub use builder::{SkeletonBuilder, UNRESOLVED_TARGET};

use crate::error::BuildError;
use classpeek_api::{ClassSkeleton, UnitFailure};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Raw bytes of one compiled unit plus the label failures are recorded
/// against.
#[derive(Debug, Clone)]
pub struct RawUnit {
    pub label: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub skeletons: Vec<ClassSkeleton>,
    pub failures: Vec<UnitFailure>,
}

/// Builds every unit independently on the rayon pool.
///
/// Malformed units are recorded and skipped; a unit whose class id was
/// already built is skipped the same way. An internal invariant violation
/// aborts the whole batch.
pub fn build_all(units: Vec<RawUnit>) -> Result<BuildOutcome, BuildError> {
    let results: Vec<(String, Result<ClassSkeleton, BuildError>)> = units
        .into_par_iter()
        .map(|unit| {
            let result = SkeletonBuilder::build_unit(&unit.label, unit.bytes);
            (unit.label, result)
        })
        .collect();

    let mut outcome = BuildOutcome::default();
    let mut origins: HashMap<String, String> = HashMap::new();
    for (label, result) in results {
        match result {
            Ok(skeleton) => {
                if let Some(first) = origins.get(skeleton.id()) {
                    let reason = format!("class {} already built from {}", skeleton.id(), first);
                    warn!("skipping {}: {}", label, reason);
                    outcome.failures.push(UnitFailure {
                        unit: label,
                        reason,
                    });
                    continue;
                }
                origins.insert(skeleton.id().to_string(), label);
                outcome.skeletons.push(skeleton);
            }
            Err(BuildError::MalformedUnit { reason, .. }) => {
                warn!("skipping {}: {}", label, reason);
                outcome.failures.push(UnitFailure {
                    unit: label,
                    reason,
                });
            }
            Err(fatal) => return Err(fatal),
        }
    }
    Ok(outcome)
}
