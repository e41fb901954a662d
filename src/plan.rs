//! The whole plan: its graph, roots, named results, and resource hints. A
//! plan may have several roots, each eventually bound to a named result,
//! not the single-root tree a simpler query plan would need.

use std::collections::BTreeMap;

use crate::error::{PlanError, PlanResult};
use crate::heuristic::graph::{NodeId, PlanGraph, PlanNode};
use crate::procedure::ProcedureSpec;
use crate::time::Instant;

/// Resource quotas. Unset (`None`) means "derive a default".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    pub memory_bytes_quota: Option<i64>,
    pub concurrency_quota: Option<i64>,
}

/// A plan: its graph, the sink nodes that produce results, the name ->
/// producing-node bindings (populated by yield resolution), the resource
/// hints, and the reference instant for relative time bounds.
///
/// `Results` uses a `BTreeMap` rather than a `HashMap` so that iteration
/// order is deterministic once yield resolution populates it. Planning the
/// same input twice must produce bit-identical output (see `DESIGN.md`).
#[derive(Clone, Debug, Default)]
pub struct Plan {
    graph: PlanGraph,
    roots: Vec<NodeId>,
    results: BTreeMap<String, NodeId>,
    resources: Resources,
    now: Instant,
}

impl Plan {
    pub fn new(now: Instant) -> Self {
        Self {
            graph: PlanGraph::new(),
            roots: Vec::new(),
            results: BTreeMap::new(),
            resources: Resources::default(),
            now,
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PlanGraph {
        &mut self.graph
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn roots_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.roots
    }

    pub fn results(&self) -> &BTreeMap<String, NodeId> {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut BTreeMap<String, NodeId> {
        &mut self.results
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Adds a node and registers it as a root (a sink with no successors).
    /// Callers wire up predecessor edges with [`Plan::add_edge`] before
    /// adding further roots on top.
    pub fn add_root(&mut self, human_id: impl Into<String>, spec: ProcedureSpec) -> PlanResult<NodeId> {
        let id = self.graph.add_node(human_id, spec)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Adds a node that is not (yet) a root.
    pub fn add_node(&mut self, human_id: impl Into<String>, spec: ProcedureSpec) -> PlanResult<NodeId> {
        self.graph.add_node(human_id, spec)
    }

    /// Connects `from` (predecessor) to `to` (successor). If `from` was
    /// previously a root, it no longer is, since it now has a successor.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> PlanResult<()> {
        self.graph.add_edge(from, to)?;
        self.roots.retain(|r| *r != from);
        Ok(())
    }

    /// `PlanGraph::replace`, routed through `Plan` so the `roots` field can
    /// be kept in sync. Implemented as an inherent method touching
    /// `self.graph` and `self.roots` directly (rather than via
    /// `graph_mut()`/`roots_mut()`) so the borrow checker sees two disjoint
    /// field borrows instead of one all-of-`self` borrow.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> PlanResult<()> {
        self.graph.replace(old, new, &mut self.roots)
    }

    /// `PlanGraph::merge_to_physical_node`, routed through `Plan` for the
    /// same reason as [`Plan::replace`].
    pub fn merge_to_physical_node(
        &mut self,
        top: NodeId,
        bottom: NodeId,
        new_spec: ProcedureSpec,
    ) -> PlanResult<NodeId> {
        self.graph.merge_to_physical_node(top, bottom, new_spec, &mut self.roots)
    }

    /// Validates the structural invariants every quiescent plan must
    /// satisfy. Used by tests and as a defensive check at the end of
    /// [`crate::planner::Planner::plan`].
    pub fn check_invariants(&self) -> PlanResult<()> {
        // 1. acyclic
        self.graph.bottom_up_order()?;

        // 3. every root has no successors; every no-successor node is a root
        let mut root_set: std::collections::HashSet<NodeId> = self.roots.iter().copied().collect();
        if root_set.len() != self.roots.len() {
            return Err(PlanError::internal("duplicate entries in roots"));
        }
        for id in self.graph.node_ids() {
            let is_sink = self.graph.successors(id).is_empty();
            let is_root = root_set.remove(&id) || self.roots.contains(&id);
            if is_sink != self.roots.contains(&id) {
                return Err(PlanError::internal(format!(
                    "root/sink mismatch at node {:?}: sink={is_sink} root={is_root}",
                    self.graph.node(id).id()
                )));
            }
        }

        Ok(())
    }

    /// Renders the node a result name is bound to, if present.
    pub fn result_node(&self, name: &str) -> Option<&PlanNode> {
        self.results.get(name).map(|id| self.graph.node(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::SourceSpec;

    #[test]
    fn add_edge_demotes_former_root() {
        let mut plan = Plan::new(0);
        let a = plan.add_root("a", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        let b = plan.add_root("b", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        plan.add_edge(a, b).unwrap();
        assert_eq!(plan.roots(), &[b]);
    }

    #[test]
    fn check_invariants_passes_for_a_simple_chain() {
        let mut plan = Plan::new(0);
        let a = plan.add_root("a", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        let b = plan.add_root("b", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        plan.add_edge(a, b).unwrap();
        plan.check_invariants().unwrap();
    }
}
