//! The push-down rewrite family: merging a downstream operator's parameters
//! into an upstream source so the source produces filtered/bounded output
//! directly. `PushDownRangeRule` is the exemplar; `PushDownFilterRule` and
//! `PushDownGroupRule` generalize the same shape to row predicates and
//! grouping keys.

use crate::error::PlanResult;
use crate::heuristic::graph::{NodeId, PlanGraph};
use crate::procedure::{ProcedureKind, ProcedureSpec};
use crate::rules::{pat, Pattern, RewriteOutcome, Rule};

/// `range(from(...))`: if the source already carries a range, no-op
/// (idempotent); otherwise push the range window into a copy of the source
/// spec and merge the two nodes.
#[derive(Debug, Default)]
pub struct PushDownRangeRule {
    pattern: PushDownPattern,
}

/// Shared pattern: `Pat(K, Pat(Source))`, built once per rule instance so
/// `Rule::pattern` can hand back a `&Pattern`.
#[derive(Debug)]
struct PushDownPattern(Pattern);

impl PushDownPattern {
    fn new(kind: ProcedureKind) -> Self {
        Self(pat(kind).child(Pattern::leaf(ProcedureKind::Source)).finish())
    }
}

impl Default for PushDownPattern {
    fn default() -> Self {
        Self::new(ProcedureKind::Range)
    }
}

impl PushDownRangeRule {
    pub fn new() -> Self {
        Self {
            pattern: PushDownPattern::new(ProcedureKind::Range),
        }
    }
}

impl Rule for PushDownRangeRule {
    fn name(&self) -> &str {
        "push_down_range"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern.0
    }

    fn rewrite(&self, graph: &PlanGraph, matched_root: NodeId) -> PlanResult<RewriteOutcome> {
        let range_spec = match graph.node(matched_root).spec() {
            ProcedureSpec::Range(r) => r.clone(),
            _ => return Ok(RewriteOutcome::Unchanged),
        };
        let bottom = graph.predecessors(matched_root)[0];
        let source_spec = match graph.node(bottom).spec() {
            ProcedureSpec::Source(s) => s,
            _ => return Ok(RewriteOutcome::Unchanged),
        };

        if source_spec.range.is_some() {
            // Idempotent no-op: already fused.
            return Ok(RewriteOutcome::Unchanged);
        }

        let new_source = source_spec.with_absorbed_range(range_spec.window);
        Ok(RewriteOutcome::Merge {
            bottom,
            new_spec: ProcedureSpec::Source(new_source),
        })
    }
}

/// `filter(from(...))`, the same push-down shape applied to row predicates.
#[derive(Debug)]
pub struct PushDownFilterRule {
    pattern: PushDownPattern,
}

impl PushDownFilterRule {
    pub fn new() -> Self {
        Self {
            pattern: PushDownPattern::new(ProcedureKind::Filter),
        }
    }
}

impl Default for PushDownFilterRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PushDownFilterRule {
    fn name(&self) -> &str {
        "push_down_filter"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern.0
    }

    fn rewrite(&self, graph: &PlanGraph, matched_root: NodeId) -> PlanResult<RewriteOutcome> {
        let filter_spec = match graph.node(matched_root).spec() {
            ProcedureSpec::Filter(f) => f.clone(),
            _ => return Ok(RewriteOutcome::Unchanged),
        };
        let bottom = graph.predecessors(matched_root)[0];
        let source_spec = match graph.node(bottom).spec() {
            ProcedureSpec::Source(s) => s,
            _ => return Ok(RewriteOutcome::Unchanged),
        };

        if source_spec.predicate.is_some() {
            return Ok(RewriteOutcome::Unchanged);
        }

        let new_source = source_spec.with_absorbed_predicate(filter_spec.predicate);
        Ok(RewriteOutcome::Merge {
            bottom,
            new_spec: ProcedureSpec::Source(new_source),
        })
    }
}

/// `group(from(...))`, the same push-down shape applied to grouping keys.
#[derive(Debug)]
pub struct PushDownGroupRule {
    pattern: PushDownPattern,
}

impl PushDownGroupRule {
    pub fn new() -> Self {
        Self {
            pattern: PushDownPattern::new(ProcedureKind::Group),
        }
    }
}

impl Default for PushDownGroupRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PushDownGroupRule {
    fn name(&self) -> &str {
        "push_down_group"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern.0
    }

    fn rewrite(&self, graph: &PlanGraph, matched_root: NodeId) -> PlanResult<RewriteOutcome> {
        let group_spec = match graph.node(matched_root).spec() {
            ProcedureSpec::Group(g) => g.clone(),
            _ => return Ok(RewriteOutcome::Unchanged),
        };
        let bottom = graph.predecessors(matched_root)[0];
        let source_spec = match graph.node(bottom).spec() {
            ProcedureSpec::Source(s) => s,
            _ => return Ok(RewriteOutcome::Unchanged),
        };

        if source_spec.group_keys.is_some() {
            return Ok(RewriteOutcome::Unchanged);
        }

        let new_source = source_spec.with_absorbed_group(&group_spec);
        Ok(RewriteOutcome::Merge {
            bottom,
            new_spec: ProcedureSpec::Source(new_source),
        })
    }
}

/// The default physical rule set, keyed implicitly by registration order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PushDownRangeRule::new()),
        Box::new(PushDownFilterRule::new()),
        Box::new(PushDownGroupRule::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::{RangeSpec, SourceSpec};
    use crate::time::{RangeWindow, TimeBound};

    #[test]
    fn range_push_down_fuses_source() {
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

        let rule = PushDownRangeRule::new();
        match rule.rewrite(&graph, range).unwrap() {
            RewriteOutcome::Merge { bottom, new_spec } => {
                assert_eq!(bottom, from);
                assert!(new_spec.as_source().unwrap().range.is_some());
            }
            RewriteOutcome::Unchanged => panic!("expected a merge"),
        }
    }

    #[test]
    fn range_push_down_is_idempotent_once_absorbed() {
        let mut graph = PlanGraph::new();
        let window = RangeWindow::new(TimeBound::Relative(-1), TimeBound::Relative(0));
        let from = graph
            .add_node(
                "from",
                ProcedureSpec::Source(SourceSpec::new("b").with_absorbed_range(window)),
            )
            .unwrap();
        let range = graph
            .add_node(
                "range",
                ProcedureSpec::Range(RangeSpec::new(window)),
            )
            .unwrap();
        graph.add_edge(from, range).unwrap();

        let rule = PushDownRangeRule::new();
        assert!(matches!(
            rule.rewrite(&graph, range).unwrap(),
            RewriteOutcome::Unchanged
        ));
    }
}
