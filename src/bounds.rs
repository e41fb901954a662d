//! Bottom-up bounds propagation.

use crate::heuristic::graph::{NodeId, PlanGraph};
use crate::procedure::ProcedureSpec;
use crate::time::{Bounds, Instant};

/// Computes `node`'s bounds from its predecessors' already-computed bounds
/// and its own operator semantics. Called by
/// [`crate::planner::Planner::plan`] during a `PlanGraph::bottom_up_walk`,
/// so every predecessor's bounds are already set by the time a node is
/// visited.
pub fn compute_bounds(graph: &PlanGraph, node: NodeId, now: Instant) -> Bounds {
    let preds = graph.predecessors(node);

    match graph.node(node).spec() {
        // Source nodes start unbounded, unless a push-down rule has already
        // fused a range window into them. In that case the source itself
        // narrows, exactly as a standalone range node would.
        ProcedureSpec::Source(s) => match &s.range {
            Some(window) => Bounds::Unbounded.intersect_window(window, now),
            None => Bounds::Unbounded,
        },

        // A range node narrows its predecessor's bounds to its own window.
        ProcedureSpec::Range(r) => {
            let input = predecessor_bounds(graph, &preds);
            input.intersect_window(&r.window, now)
        }

        // Every other kind passes its predecessor's bounds through
        // unchanged; with more than one predecessor, bounds union by
        // default. No kind in this closed set currently overrides that
        // default.
        ProcedureSpec::Filter(_)
        | ProcedureSpec::Group(_)
        | ProcedureSpec::Aggregate(_)
        | ProcedureSpec::Yield(_) => predecessor_bounds(graph, &preds),
    }
}

fn predecessor_bounds(graph: &PlanGraph, preds: &[NodeId]) -> Bounds {
    preds
        .iter()
        .map(|p| graph.node(*p).bounds().unwrap_or(Bounds::Unbounded))
        .fold(None, |acc, b| {
            Some(match acc {
                None => b,
                Some(a) => a.union(&b),
            })
        })
        .unwrap_or(Bounds::Unbounded)
}
