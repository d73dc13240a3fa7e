use classpeek_api::{ClassSkeleton, MethodSkeleton, OpCode, TypeId};
use std::collections::BTreeSet;

/// Which attributes and sibling methods each method of a class touches.
///
/// Constructors and the static initializer are left out: they touch every
/// field by nature and would mask real cohesion. Compiler-generated bodies
/// are left out too.
pub struct Usage<'a> {
    pub methods: Vec<&'a MethodSkeleton>,
    pub attribute_count: usize,
    /// Per method, indexes into the class's attribute list.
    pub attributes: Vec<BTreeSet<usize>>,
    /// Per method, indexes into `methods` it invokes.
    pub calls: Vec<BTreeSet<usize>>,
}

impl<'a> Usage<'a> {
    pub fn of(class: &'a ClassSkeleton) -> Self {
        let methods: Vec<&MethodSkeleton> = class
            .methods()
            .iter()
            .filter(|m| !m.is_constructor() && !m.is_static_initializer() && !m.is_synthetic())
            .collect();

        let attribute_index = |member: &str| {
            class
                .attributes()
                .iter()
                .position(|attr| attr.name == member)
        };

        let mut attributes = Vec::with_capacity(methods.len());
        let mut calls = Vec::with_capacity(methods.len());
        for method in &methods {
            let mut used = BTreeSet::new();
            let mut called = BTreeSet::new();
            for op in method.ops() {
                let (owner, member) = op.split_target();
                let own = owner.is_none_or(|owner| owner == class.id());
                if !own {
                    continue;
                }
                match op.code {
                    OpCode::Get | OpCode::PutStatic => {
                        if let Some(index) = attribute_index(member) {
                            used.insert(index);
                        }
                    }
                    OpCode::Call if owner.is_some() => {
                        called.extend(
                            methods
                                .iter()
                                .enumerate()
                                .filter(|(_, m)| m.name() == member)
                                .map(|(i, _)| i),
                        );
                    }
                    OpCode::Call => {}
                }
            }
            attributes.push(used);
            calls.push(called);
        }

        Self {
            methods,
            attribute_count: class.attributes().len(),
            attributes,
            calls,
        }
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn pair_count(&self) -> usize {
        let k = self.methods.len();
        k * k.saturating_sub(1) / 2
    }

    /// All unordered method pairs `(i, j)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let k = self.methods.len();
        (0..k).flat_map(move |i| (i + 1..k).map(move |j| (i, j)))
    }

    pub fn shares_attribute(&self, i: usize, j: usize) -> bool {
        !self.attributes[i].is_disjoint(&self.attributes[j])
    }

    pub fn total_attribute_uses(&self) -> usize {
        self.attributes.iter().map(BTreeSet::len).sum()
    }

    /// Distinct argument types of each method, and their union.
    pub fn parameter_types(&self) -> (Vec<BTreeSet<&'a TypeId>>, BTreeSet<&'a TypeId>) {
        let per_method: Vec<BTreeSet<&TypeId>> = self
            .methods
            .iter()
            .map(|&m| m.args().iter().collect())
            .collect();
        let all = per_method.iter().flatten().copied().collect();
        (per_method, all)
    }
}
