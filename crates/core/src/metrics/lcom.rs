use super::{Metric, Usage};
use classpeek_api::{ClassSkeleton, Score};

/// Chidamber & Kemerer: method pairs sharing no attribute minus pairs
/// sharing one, floored at zero.
pub struct Lcom;

impl Metric for Lcom {
    fn name(&self) -> &'static str {
        "LCOM"
    }

    fn description(&self) -> &'static str {
        "Lack of cohesion in methods (Chidamber & Kemerer)"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        if usage.method_count() == 0 {
            return Score::NotApplicable;
        }
        let (mut disjoint, mut shared) = (0usize, 0usize);
        for (i, j) in usage.pairs() {
            if usage.shares_attribute(i, j) {
                shared += 1;
            } else {
                disjoint += 1;
            }
        }
        Score::from_count(disjoint.saturating_sub(shared))
    }
}

pub struct Lcom2;

impl Metric for Lcom2 {
    fn name(&self) -> &'static str {
        "LCOM2"
    }

    fn description(&self) -> &'static str {
        "One minus the share of (method, attribute) pairs that are used"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let k = usage.method_count() as f64;
        let a = usage.attribute_count as f64;
        match Score::ratio(usage.total_attribute_uses() as f64, k * a) {
            Score::Value(share) => Score::Value(1.0 - share),
            na => na,
        }
    }
}

/// Henderson-Sellers LCOM*, in `[0, 2]`.
pub struct Lcom3;

impl Metric for Lcom3 {
    fn name(&self) -> &'static str {
        "LCOM3"
    }

    fn description(&self) -> &'static str {
        "Lack of cohesion in methods (Henderson-Sellers)"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let k = usage.method_count();
        if k <= 1 || usage.attribute_count == 0 {
            return Score::NotApplicable;
        }
        let k = k as f64;
        let mean = usage.total_attribute_uses() as f64 / usage.attribute_count as f64;
        Score::Value((mean - k) / (1.0 - k))
    }
}

/// Sensitive class cohesion (Fernández & Peña).
pub struct Scom;

impl Metric for Scom {
    fn name(&self) -> &'static str {
        "SCOM"
    }

    fn description(&self) -> &'static str {
        "Sensitive class cohesion metric"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        if usage.method_count() < 2 || usage.attribute_count == 0 {
            return Score::NotApplicable;
        }
        let a = usage.attribute_count as f64;
        let mut sum = 0.0;
        for (i, j) in usage.pairs() {
            let (left, right) = (&usage.attributes[i], &usage.attributes[j]);
            let smaller = left.len().min(right.len());
            if smaller == 0 {
                continue;
            }
            let common = left.intersection(right).count() as f64;
            let union = left.union(right).count() as f64;
            sum += (common / smaller as f64) * (union / a);
        }
        Score::ratio(sum, usage.pair_count() as f64)
    }
}
