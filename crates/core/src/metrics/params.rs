use super::{Metric, Usage};
use classpeek_api::{ClassSkeleton, Score};

/// Cohesion among methods of a class (Bansiya et al.), over argument types.
pub struct Camc;

impl Metric for Camc {
    fn name(&self) -> &'static str {
        "CAMC"
    }

    fn description(&self) -> &'static str {
        "Cohesion among methods, by shared parameter types"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let (per_method, all) = usage.parameter_types();
        let occupied: usize = per_method.iter().map(|types| types.len()).sum();
        let cells = per_method.len() * all.len();
        Score::ratio(occupied as f64, cells as f64)
    }
}

/// Normalized Hamming distance between the parameter-type rows of every
/// method pair (Counsell et al.).
pub struct Nhd;

impl Metric for Nhd {
    fn name(&self) -> &'static str {
        "NHD"
    }

    fn description(&self) -> &'static str {
        "Normalized Hamming distance of method parameter types"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let (per_method, all) = usage.parameter_types();
        let k = per_method.len();
        let l = all.len();
        if k < 2 || l == 0 {
            return Score::NotApplicable;
        }
        let disagreements: usize = all
            .iter()
            .map(|ty| {
                let c = per_method.iter().filter(|types| types.contains(ty)).count();
                c * (k - c)
            })
            .sum();
        let (k, l) = (k as f64, l as f64);
        Score::Value(1.0 - 2.0 / (l * k * (k - 1.0)) * disagreements as f64)
    }
}
