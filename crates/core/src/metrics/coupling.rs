use super::Metric;
use classpeek_api::{ClassSkeleton, Score};

/// Afferent coupling: how many other analyzed classes reference a member
/// of this one through a qualified target.
///
/// Instance field accesses carry bare targets and do not count.
pub struct Ca;

impl Metric for Ca {
    fn name(&self) -> &'static str {
        "CA"
    }

    fn description(&self) -> &'static str {
        "Afferent coupling among analyzed classes"
    }

    fn score(&self, class: &ClassSkeleton, codebase: &[ClassSkeleton]) -> Score {
        let dependents = codebase
            .iter()
            .filter(|other| other.id() != class.id())
            .filter(|other| {
                other
                    .methods()
                    .iter()
                    .flat_map(|m| m.ops())
                    .any(|op| op.split_target().0 == Some(class.id()))
            })
            .count();
        Score::from_count(dependents)
    }
}
