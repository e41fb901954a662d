//! The rule contract and pattern matcher.

mod pattern;
pub mod push_down;

pub use pattern::{pat, Pattern, PatternBuilder};

use crate::error::PlanResult;
use crate::heuristic::graph::{NodeId, PlanGraph};
use crate::procedure::ProcedureSpec;

/// What a rule's `rewrite` produced. `Unchanged` means the pattern was
/// recognized but deliberately not rewritten (e.g. already fused); this
/// must not re-trigger on the next pass. `Merge` fuses `bottom` into the
/// matched root, which the engine splices into the graph via
/// `PlanGraph::merge_to_physical_node`.
#[derive(Debug)]
pub enum RewriteOutcome {
    Unchanged,
    Merge {
        bottom: NodeId,
        new_spec: ProcedureSpec,
    },
}

/// `rewrite` is pure with respect to the graph: it reads but does not
/// mutate. The engine, not the rule, performs the structural splice once a
/// rewrite is produced.
pub trait Rule: std::fmt::Debug {
    fn name(&self) -> &str;
    fn pattern(&self) -> &Pattern;
    fn rewrite(&self, graph: &PlanGraph, matched_root: NodeId) -> PlanResult<RewriteOutcome>;
}

/// Structural, exact-on-kind matching: `Pat(K, children)` matches a node
/// whose kind equals `K` and whose ordered predecessors match `children`; a
/// leaf `Pat(K)` matches regardless of predecessors.
pub fn matches(graph: &PlanGraph, node: NodeId, pattern: &Pattern) -> bool {
    if graph.node(node).spec().kind() != pattern.kind() {
        return false;
    }
    match pattern.children() {
        None => true,
        Some(children) => {
            let preds = graph.predecessors(node);
            preds.len() == children.len()
                && preds
                    .iter()
                    .zip(children)
                    .all(|(pred, child)| matches(graph, *pred, child))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::{ProcedureKind, RangeSpec, SourceSpec};
    use crate::time::{RangeWindow, TimeBound};

    #[test]
    fn leaf_matches_any_predecessor_shape() {
        let mut graph = PlanGraph::new();
        let from = graph
            .add_node("from", ProcedureSpec::Source(SourceSpec::new("b")))
            .unwrap();
        let range = graph
            .add_node(
                "range",
                ProcedureSpec::Range(RangeSpec::new(RangeWindow::new(
                    TimeBound::Relative(-1),
                    TimeBound::Relative(0),
                ))),
            )
            .unwrap();
        graph.add_edge(from, range).unwrap();

        let pattern = pat(ProcedureKind::Range)
            .child(Pattern::leaf(ProcedureKind::Source))
            .finish();
        assert!(matches(&graph, range, &pattern));
        assert!(!matches(&graph, from, &pattern));
    }
}
