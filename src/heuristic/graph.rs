//! The plan graph: an arena of nodes with ordered predecessor/successor
//! edges.
//!
//! The full structural API a plan needs: `add_edge`, `remove_edge`,
//! `replace`, `merge_to_physical_node`, `shallow_copy`, and the two
//! traversal orders, built over `petgraph::StableGraph`. The plan owns a
//! flat array of nodes and edges are index pairs, so node identities stay
//! stable across structural rewrites without a hand-rolled arena.

use std::collections::HashMap;

use petgraph::prelude::{NodeIndex, StableGraph};
use petgraph::{algo, Directed, Direction};

use crate::cost::{Cost, Statistics};
use crate::error::{PlanError, PlanResult};
use crate::procedure::ProcedureSpec;
use crate::properties::PhysicalAttributes;
use crate::time::Bounds;

/// Handle into the graph's arena. Stable for the lifetime of a node; reused
/// slots are never handed out for a *different* node while the old handle
/// could still be observed by a caller (`StableGraph` guarantees this).
pub type NodeId = NodeIndex<u32>;

#[derive(Clone, Copy, Debug, Default)]
struct EdgeMeta {
    /// This edge's position among the target's predecessors, at the time it
    /// was added. Predecessor order is semantically meaningful: many
    /// operators are asymmetric, e.g. join left vs right.
    pred_ordinal: u32,
    /// Insertion sequence, used only to give successor order something
    /// deterministic to sort by; not semantically meaningful.
    seq: u64,
}

/// Physical-only metadata a node carries once the physical planning pass has
/// touched it: cost function, required-input attribute set, and
/// provided-output attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalMeta {
    pub cost: Option<Cost>,
    pub required_attrs: Vec<PhysicalAttributes>,
    pub output_attrs: PhysicalAttributes,
}

impl PhysicalMeta {
    pub fn placeholder() -> Self {
        Self {
            cost: None,
            required_attrs: Vec::new(),
            output_attrs: PhysicalAttributes::empty(),
        }
    }
}

/// One vertex in the plan. Logical nodes carry `physical: None`; physical
/// nodes carry `Some(..)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanNode {
    id: String,
    spec: ProcedureSpec,
    bounds: Option<Bounds>,
    physical: Option<PhysicalMeta>,
}

impl PlanNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spec(&self) -> &ProcedureSpec {
        &self.spec
    }

    pub fn spec_mut(&mut self) -> &mut ProcedureSpec {
        &mut self.spec
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    pub fn physical(&self) -> Option<&PhysicalMeta> {
        self.physical.as_ref()
    }

    pub fn is_physical(&self) -> bool {
        self.physical.is_some()
    }

    pub fn make_physical(&mut self, meta: PhysicalMeta) {
        self.physical = Some(meta);
    }
}

/// The arena plus its edges. Owned by a [`crate::plan::Plan`]; every
/// structural mutation goes through one of its methods, never direct
/// `petgraph` calls from outside this module. Structural rewrites are
/// performed only by the rule engine and the planner's post-passes.
#[derive(Clone, Debug, Default)]
pub struct PlanGraph {
    graph: StableGraph<PlanNode, EdgeMeta, Directed, u32>,
    id_index: HashMap<String, NodeId>,
    next_seq: u64,
    copy_counter: u32,
}

impl PlanGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.graph.node_weight(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.graph[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut PlanNode {
        &mut self.graph[id]
    }

    pub fn find_id(&self, human_id: &str) -> Option<NodeId> {
        self.id_index.get(human_id).copied()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_indices().collect()
    }

    /// Inserts a fresh, edgeless node. Fails if `human_id` is already in use
    /// (plan node identities must be unique within a plan).
    pub fn add_node(&mut self, human_id: impl Into<String>, spec: ProcedureSpec) -> PlanResult<NodeId> {
        let human_id = human_id.into();
        if self.id_index.contains_key(&human_id) {
            return Err(PlanError::invalid(format!(
                "duplicate node id {human_id:?}"
            )));
        }
        let node_id = self.graph.add_node(PlanNode {
            id: human_id.clone(),
            spec,
            bounds: None,
            physical: None,
        });
        self.id_index.insert(human_id, node_id);
        Ok(node_id)
    }

    fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.graph.find_edge(from, to).is_some()
    }

    /// Appends `to` to `from`'s successors and `from` to `to`'s
    /// predecessors. Fails on a duplicate edge or if it would create a
    /// cycle.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> PlanResult<()> {
        if self.has_edge(from, to) {
            return Err(PlanError::invalid(format!(
                "duplicate edge {:?} -> {:?}",
                self.node(from).id(),
                self.node(to).id()
            )));
        }
        // `to` already reaching `from` plus this new from->to edge would
        // close a cycle.
        if algo::has_path_connecting(&self.graph, to, from, None) {
            return Err(PlanError::invalid(format!(
                "edge {:?} -> {:?} would create a cycle",
                self.node(from).id(),
                self.node(to).id()
            )));
        }
        let pred_ordinal = self.predecessors(to).len() as u32;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(from, to, EdgeMeta { pred_ordinal, seq });
        Ok(())
    }

    /// Adds an edge reusing an explicit predecessor ordinal, used when
    /// rewiring edges so a node keeps its original slot in a successor's
    /// predecessor list (`replace`, `merge_to_physical_node`).
    fn add_edge_at(&mut self, from: NodeId, to: NodeId, pred_ordinal: u32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(from, to, EdgeMeta { pred_ordinal, seq });
    }

    /// Symmetric removal; fails if the edge is absent.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> PlanResult<()> {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                Ok(())
            }
            None => Err(PlanError::invalid(format!(
                "no edge {:?} -> {:?}",
                self.node(from).id(),
                self.node(to).id()
            ))),
        }
    }

    /// Ordered predecessors of `id`.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        let mut preds: Vec<(u32, NodeId)> = self
            .graph
            .edges_directed(id, Direction::Incoming)
            .map(|e| (e.weight().pred_ordinal, e.source()))
            .collect();
        preds.sort_by_key(|(ordinal, _)| *ordinal);
        preds.into_iter().map(|(_, n)| n).collect()
    }

    /// Successors of `id`. Order is preserved for determinism but carries no
    /// semantic meaning.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        let mut succs: Vec<(u64, NodeId)> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| (e.weight().seq, e.target()))
            .collect();
        succs.sort_by_key(|(seq, _)| *seq);
        succs.into_iter().map(|(_, n)| n).collect()
    }

    /// Rewires: every successor edge `old -> x` becomes `new -> x`,
    /// preserving `x`'s predecessor ordering; `old`'s predecessor edges are
    /// dropped; if `old` was a root, `new` replaces it. `old` is removed.
    pub fn replace(&mut self, old: NodeId, new: NodeId, roots: &mut Vec<NodeId>) -> PlanResult<()> {
        if old == new {
            return Ok(());
        }
        for succ in self.successors(old) {
            let edge = self
                .graph
                .find_edge(old, succ)
                .ok_or_else(|| PlanError::internal("missing successor edge during replace"))?;
            let ordinal = self.graph[edge].pred_ordinal;
            self.graph.remove_edge(edge);
            self.add_edge_at(new, succ, ordinal);
        }
        for pred in self.predecessors(old) {
            if let Some(edge) = self.graph.find_edge(pred, old) {
                self.graph.remove_edge(edge);
            }
        }
        self.remove_node(old);
        for root in roots.iter_mut() {
            if *root == old {
                *root = new;
            }
        }
        Ok(())
    }

    /// Fuses `bottom` (feeding `top`) into a single physical node carrying
    /// `new_spec`. The merged node inherits `bottom`'s predecessors and
    /// `top`'s successors. Fails if `bottom` has successors other than
    /// `top`.
    pub fn merge_to_physical_node(
        &mut self,
        top: NodeId,
        bottom: NodeId,
        new_spec: ProcedureSpec,
        roots: &mut Vec<NodeId>,
    ) -> PlanResult<NodeId> {
        let bottom_succs = self.successors(bottom);
        if bottom_succs != [top] {
            return Err(PlanError::internal(format!(
                "cannot merge: {:?} has successors other than {:?}",
                self.node(bottom).id(),
                self.node(top).id()
            )));
        }

        let new_id = format!(
            "{}_merged_{}",
            self.node(bottom).id(),
            self.node(top).id()
        );
        let bottom_preds = self.predecessors(bottom);
        let top_succs = self.successors(top);

        let (cost, _) = new_spec.self_cost(&[]);
        let merged = self.add_node(new_id, new_spec)?;
        self.node_mut(merged).make_physical(PhysicalMeta {
            cost: Some(cost),
            required_attrs: Vec::new(),
            output_attrs: PhysicalAttributes::empty(),
        });

        for pred in bottom_preds {
            self.add_edge(pred, merged)?;
        }
        for succ in top_succs {
            let edge = self
                .graph
                .find_edge(top, succ)
                .ok_or_else(|| PlanError::internal("missing successor edge during merge"))?;
            let ordinal = self.graph[edge].pred_ordinal;
            self.graph.remove_edge(edge);
            self.add_edge_at(merged, succ, ordinal);
        }

        let was_root = roots.contains(&top);
        self.remove_node(top);
        self.remove_node(bottom);
        if was_root {
            for root in roots.iter_mut() {
                if *root == top {
                    *root = merged;
                }
            }
        }
        Ok(merged)
    }

    /// Produces a node with the same spec (deep-copied) and no edges, with a
    /// fresh identity suffixed `_copy` (uniquified on collision).
    pub fn shallow_copy(&mut self, node: NodeId) -> NodeId {
        let spec = self.node(node).spec().deep_copy();
        let base = format!("{}_copy", self.node(node).id());
        let mut candidate = base.clone();
        while self.id_index.contains_key(&candidate) {
            self.copy_counter += 1;
            candidate = format!("{base}{}", self.copy_counter);
        }
        self.add_node(candidate, spec)
            .expect("uniquified copy id cannot collide")
    }

    fn remove_node(&mut self, id: NodeId) {
        let human_id = self.node(id).id().to_string();
        self.graph.remove_node(id);
        self.id_index.remove(&human_id);
    }

    /// Topological order, source-first: every node is visited after all of
    /// its predecessors. Ties (nodes that become ready in the same step) are
    /// broken by node identity, so the rule engine's traversal is a stable,
    /// reproducible order rather than an artifact of insertion sequence.
    /// Kahn's algorithm with an identity-ordered ready set gives that
    /// directly; `petgraph::algo::toposort`'s DFS-based order does not make
    /// the same guarantee.
    pub fn bottom_up_order(&self) -> PlanResult<Vec<NodeId>> {
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
        for id in self.graph.node_indices() {
            in_degree.insert(id, self.predecessors(id).len());
        }

        let mut ready: std::collections::BTreeSet<(String, NodeId)> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| (self.node(*id).id().to_string(), *id))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((_, id)) = ready.iter().next().cloned() {
            ready.remove(&(self.node(id).id().to_string(), id));
            order.push(id);
            for succ in self.successors(id) {
                let degree = in_degree.get_mut(&succ).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    ready.insert((self.node(succ).id().to_string(), succ));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(PlanError::internal("graph contains a cycle"));
        }
        Ok(order)
    }

    /// The reverse: every node is visited before its successors, i.e.
    /// roots/sinks first.
    pub fn top_down_order(&self) -> PlanResult<Vec<NodeId>> {
        let mut order = self.bottom_up_order()?;
        order.reverse();
        Ok(order)
    }

    /// Visits each node after all of its predecessors, calling `visit` with
    /// mutable access to the graph. The visitor must not add or remove
    /// edges.
    pub fn bottom_up_walk(
        &mut self,
        mut visit: impl FnMut(NodeId, &mut PlanGraph) -> PlanResult<()>,
    ) -> PlanResult<()> {
        for id in self.bottom_up_order()? {
            visit(id, self)?;
        }
        Ok(())
    }

    /// Visits each node before its successors.
    pub fn top_down_walk(
        &mut self,
        mut visit: impl FnMut(NodeId, &mut PlanGraph) -> PlanResult<()>,
    ) -> PlanResult<()> {
        for id in self.top_down_order()? {
            visit(id, self)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::SourceSpec;

    fn source(g: &mut PlanGraph, id: &str) -> NodeId {
        g.add_node(id, ProcedureSpec::Source(SourceSpec::new("b"))).unwrap()
    }

    #[test]
    fn add_edge_rejects_duplicates_and_cycles() {
        let mut g = PlanGraph::new();
        let a = source(&mut g, "a");
        let b = source(&mut g, "b");
        g.add_edge(a, b).unwrap();
        assert!(g.add_edge(a, b).is_err());
        assert!(g.add_edge(b, a).is_err());
    }

    #[test]
    fn predecessor_order_is_stable() {
        let mut g = PlanGraph::new();
        let left = source(&mut g, "left");
        let right = source(&mut g, "right");
        let join = source(&mut g, "join");
        g.add_edge(left, join).unwrap();
        g.add_edge(right, join).unwrap();
        assert_eq!(g.predecessors(join), vec![left, right]);
    }

    #[test]
    fn replace_rewires_successors_and_roots() {
        let mut g = PlanGraph::new();
        let a = source(&mut g, "a");
        let b = source(&mut g, "b");
        let c = source(&mut g, "c");
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        let mut roots = vec![c];
        g.replace(c, b, &mut roots).unwrap();
        assert_eq!(roots, vec![b]);
        assert!(!g.contains_node(c));
        assert_eq!(g.successors(a), vec![b]);
    }

    #[test]
    fn shallow_copy_uniquifies_on_collision() {
        let mut g = PlanGraph::new();
        let a = source(&mut g, "a");
        let c1 = g.shallow_copy(a);
        assert_eq!(g.node(c1).id(), "a_copy");
        let c2 = g.shallow_copy(a);
        assert_ne!(g.node(c2).id(), g.node(c1).id());
    }

    #[test]
    fn bottom_up_order_respects_predecessors() {
        let mut g = PlanGraph::new();
        let a = source(&mut g, "a");
        let b = source(&mut g, "b");
        let c = source(&mut g, "c");
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        let order = g.bottom_up_order().unwrap();
        let pos = |n: NodeId| order.iter().position(|x| *x == n).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }
}
