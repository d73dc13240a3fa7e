use super::{Metric, Usage};
use classpeek_api::{ClassSkeleton, Score};
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use petgraph::unionfind::UnionFind;

/// Hitz & Montazeri: connected components of the method graph, where two
/// methods are linked when they share an attribute or one calls the other.
pub struct Lcom4;

impl Metric for Lcom4 {
    fn name(&self) -> &'static str {
        "LCOM4"
    }

    fn description(&self) -> &'static str {
        "Connected components of methods linked by attributes or calls"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        if usage.method_count() == 0 {
            return Score::NotApplicable;
        }

        let mut graph = UnGraph::<(), ()>::new_undirected();
        let nodes: Vec<_> = (0..usage.method_count()).map(|_| graph.add_node(())).collect();
        for (i, j) in usage.pairs() {
            if usage.shares_attribute(i, j) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
        for (caller, callees) in usage.calls.iter().enumerate() {
            for &callee in callees {
                if callee != caller {
                    graph.add_edge(nodes[caller], nodes[callee], ());
                }
            }
        }
        Score::from_count(connected_components(&graph))
    }
}

/// Bieman & Kang tight class cohesion: share of method pairs directly
/// connected through a common attribute.
pub struct Tcc;

impl Metric for Tcc {
    fn name(&self) -> &'static str {
        "TCC"
    }

    fn description(&self) -> &'static str {
        "Tight class cohesion"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let direct = usage
            .pairs()
            .filter(|&(i, j)| usage.shares_attribute(i, j))
            .count();
        Score::ratio(direct as f64, usage.pair_count() as f64)
    }
}

/// Bieman & Kang loose class cohesion: share of method pairs connected
/// directly or through a chain of attribute-sharing methods.
pub struct Lcc;

impl Metric for Lcc {
    fn name(&self) -> &'static str {
        "LCC"
    }

    fn description(&self) -> &'static str {
        "Loose class cohesion"
    }

    fn score(&self, class: &ClassSkeleton, _codebase: &[ClassSkeleton]) -> Score {
        let usage = Usage::of(class);
        let mut components = UnionFind::<usize>::new(usage.method_count());
        for (i, j) in usage.pairs() {
            if usage.shares_attribute(i, j) {
                components.union(i, j);
            }
        }
        let connected = usage
            .pairs()
            .filter(|&(i, j)| components.equiv(i, j))
            .count();
        Score::ratio(connected as f64, usage.pair_count() as f64)
    }
}
