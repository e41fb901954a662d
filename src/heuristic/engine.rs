//! The fixpoint loop driving rewrite rules to quiescence.
//!
//! Each pass visits every node once, applying at most one rule per node, and
//! a new pass starts only when the previous one changed something (see
//! `DESIGN.md` for why this is a pass/dirty-flag loop rather than a
//! restart-on-any-change loop).

use crate::cancellation::CancellationToken;
use crate::error::{PlanError, PlanResult};
use crate::plan::Plan;
use crate::rules::{matches, RewriteOutcome, Rule};

/// Default bound on the number of passes before giving up.
pub const DEFAULT_MAX_PASSES: usize = 100;

/// Order in which nodes are offered to rules within a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOrder {
    /// Roots (sinks) first, proceeding toward sources. The engine's
    /// default.
    TopDown,
    /// Sources first, proceeding toward roots.
    BottomUp,
}

impl Default for MatchOrder {
    fn default() -> Self {
        MatchOrder::TopDown
    }
}

/// Drives a plan to a fixpoint under a set of registered rules.
pub struct HeuristicEngine {
    rules: Vec<Box<dyn Rule>>,
    match_order: MatchOrder,
    max_passes: usize,
}

impl HeuristicEngine {
    /// Rules are sorted by name once at construction, so their iteration
    /// order within a pass is deterministic.
    pub fn new(mut rules: Vec<Box<dyn Rule>>, match_order: MatchOrder, max_passes: usize) -> Self {
        rules.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            rules,
            match_order,
            max_passes,
        }
    }

    pub fn with_default_rules(match_order: MatchOrder) -> Self {
        Self::new(
            crate::rules::push_down::default_rules(),
            match_order,
            DEFAULT_MAX_PASSES,
        )
    }

    pub fn run(&self, plan: &mut Plan, cancellation: &CancellationToken) -> PlanResult<()> {
        for _pass in 0..self.max_passes {
            cancellation.check()?;

            let order = match self.match_order {
                MatchOrder::TopDown => plan.graph().top_down_order()?,
                MatchOrder::BottomUp => plan.graph().bottom_up_order()?,
            };

            let mut dirty = false;
            for node in order {
                // A node consumed by an earlier merge within this same pass
                // is no longer present; skip it rather than re-matching a
                // stale handle.
                if !plan.graph().contains_node(node) {
                    continue;
                }

                for rule in &self.rules {
                    if !matches(plan.graph(), node, rule.pattern()) {
                        continue;
                    }

                    log::trace!(
                        "trying rule {:?} at node {:?}",
                        rule.name(),
                        plan.graph().node(node).id()
                    );

                    match rule.rewrite(plan.graph(), node)? {
                        RewriteOutcome::Unchanged => {
                            log::trace!(
                                "rule {:?} recognized but did not rewrite {:?}",
                                rule.name(),
                                plan.graph().node(node).id()
                            );
                        }
                        RewriteOutcome::Merge { bottom, new_spec } => {
                            plan.merge_to_physical_node(node, bottom, new_spec)?;
                            dirty = true;
                            // `node` no longer exists; move to the next
                            // entry in the precomputed order.
                            break;
                        }
                    }
                }
            }

            if !dirty {
                return Ok(());
            }
        }

        Err(PlanError::Convergence {
            passes: self.max_passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::{ProcedureSpec, RangeSpec, SourceSpec};
    use crate::time::{RangeWindow, TimeBound};

    fn chain_plan() -> Plan {
        let mut plan = Plan::new(0);
        let from = plan
            .add_node("from", ProcedureSpec::Source(SourceSpec::new("b")))
            .unwrap();
        let window = RangeWindow::new(TimeBound::Relative(-1_000), TimeBound::Relative(0));
        let range = plan
            .add_root("range", ProcedureSpec::Range(RangeSpec::new(window)))
            .unwrap();
        plan.add_edge(from, range).unwrap();
        plan
    }

    #[test]
    fn push_down_fuses_and_terminates() {
        let mut plan = chain_plan();
        let engine = HeuristicEngine::with_default_rules(MatchOrder::TopDown);
        engine.run(&mut plan, &CancellationToken::new()).unwrap();

        assert_eq!(plan.graph().node_count(), 1);
        let root = plan.roots()[0];
        assert!(plan
            .graph()
            .node(root)
            .spec()
            .as_source()
            .unwrap()
            .range
            .is_some());
    }

    #[test]
    fn push_down_is_idempotent_across_reruns() {
        let mut plan = chain_plan();
        let engine = HeuristicEngine::with_default_rules(MatchOrder::TopDown);
        engine.run(&mut plan, &CancellationToken::new()).unwrap();
        let first_id = plan.graph().node(plan.roots()[0]).id().to_string();

        engine.run(&mut plan, &CancellationToken::new()).unwrap();
        let second_id = plan.graph().node(plan.roots()[0]).id().to_string();
        assert_eq!(first_id, second_id);
    }
}
