//! The top-level physical planning pass: run the rule engine to a fixpoint,
//! resolve yields into named results, propagate time bounds bottom-up, and
//! fill in resource quota defaults.

use crate::bounds::compute_bounds;
use crate::cancellation::CancellationToken;
use crate::error::{PlanError, PlanResult};
use crate::heuristic::{HeuristicEngine, MatchOrder};
use crate::plan::Plan;
use crate::procedure::DEFAULT_YIELD_NAME;

/// Configures a [`Planner`] before it is built.
pub enum PlannerOption {
    /// Overrides the default memory quota applied when an input plan
    /// requests none.
    WithDefaultMemoryLimit(i64),
    /// Replaces the default rule set outright.
    WithRuleSet(Vec<Box<dyn crate::rules::Rule>>),
    /// Removes a single rule (matched by name) from whatever rule set is
    /// otherwise active.
    WithoutRule(String),
}

/// Converts a logical plan into a physical one.
pub struct Planner {
    engine: HeuristicEngine,
    default_memory_limit: i64,
}

impl Planner {
    /// A planner with the default push-down rule set and `i64::MAX` as the
    /// fallback memory quota.
    pub fn new(options: Vec<PlannerOption>) -> Self {
        let mut rules = crate::rules::push_down::default_rules();
        let mut default_memory_limit = i64::MAX;

        for opt in options {
            match opt {
                PlannerOption::WithDefaultMemoryLimit(limit) => default_memory_limit = limit,
                PlannerOption::WithRuleSet(set) => rules = set,
                PlannerOption::WithoutRule(name) => rules.retain(|r| r.name() != name),
            }
        }

        Self {
            engine: HeuristicEngine::new(
                rules,
                MatchOrder::TopDown,
                crate::heuristic::engine::DEFAULT_MAX_PASSES,
            ),
            default_memory_limit,
        }
    }

    /// Runs the full physical planning pass on `plan`, consuming it and
    /// returning the physical plan, or the first `PlanError` encountered, at
    /// which point `plan`'s partial mutation is discarded along with it.
    /// The pass is all-or-nothing from the caller's perspective.
    pub fn plan(&self, mut plan: Plan, cancellation: &CancellationToken) -> PlanResult<Plan> {
        self.engine.run(&mut plan, cancellation)?;

        cancellation.check()?;
        remove_yields(&mut plan)?;

        cancellation.check()?;
        let original_result_count = plan.results().len();
        let order = plan.graph().bottom_up_order()?;
        for id in order {
            let bounds = compute_bounds(plan.graph(), id, plan.now());
            plan.graph_mut().node_mut(id).set_bounds(bounds);
        }

        let mut resources = plan.resources();
        if resources.memory_bytes_quota.is_none() {
            resources.memory_bytes_quota = Some(self.default_memory_limit);
        }
        if resources.concurrency_quota.is_none() {
            resources.concurrency_quota = Some(original_result_count as i64);
        }
        *plan.resources_mut() = resources;

        plan.check_invariants()?;
        Ok(plan)
    }
}

/// Converts every root into a named result: a `Yield` root contributes its
/// own predecessor as the bound node under the yield's name (and is itself
/// spliced out of the graph); any other root contributes itself under the
/// reserved default name. Duplicate names, and a yield with other than
/// exactly one predecessor, are user-visible errors.
fn remove_yields(plan: &mut Plan) -> PlanResult<()> {
    for root in plan.roots().to_vec() {
        let spec = plan.graph().node(root).spec().clone();

        if let Some(yield_spec) = spec.as_yield() {
            let name = yield_spec.name.clone();
            let preds = plan.graph().predecessors(root);
            if preds.len() != 1 {
                return Err(PlanError::invalid(
                    "yield must have exactly one predecessor",
                ));
            }
            if plan.results().contains_key(&name) {
                return Err(PlanError::invalid(format!(
                    "found duplicate yield name {name:?}"
                )));
            }
            let new_root = preds[0];
            plan.replace(root, new_root)?;
            plan.results_mut().insert(name, new_root);
        } else {
            let name = DEFAULT_YIELD_NAME.to_string();
            if plan.results().contains_key(&name) {
                return Err(PlanError::invalid(format!(
                    "found duplicate yield name {name:?}"
                )));
            }
            plan.results_mut().insert(name, root);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::{ProcedureSpec, RangeSpec, SourceSpec, YieldSpec};
    use crate::time::{RangeWindow, TimeBound};

    fn simple_plan() -> Plan {
        let mut plan = Plan::new(10_000);
        let from = plan
            .add_node("from", ProcedureSpec::Source(SourceSpec::new("b")))
            .unwrap();
        let window = RangeWindow::new(TimeBound::Relative(-1_000), TimeBound::Relative(0));
        let range = plan
            .add_node("range", ProcedureSpec::Range(RangeSpec::new(window)))
            .unwrap();
        plan.add_edge(from, range).unwrap();
        let yield_node = plan
            .add_root("y", ProcedureSpec::Yield(YieldSpec::new("r0")))
            .unwrap();
        plan.add_edge(range, yield_node).unwrap();
        plan
    }

    #[test]
    fn plan_resolves_yield_into_named_result_and_fills_defaults() {
        let planner = Planner::new(vec![]);
        let plan = planner.plan(simple_plan(), &CancellationToken::new()).unwrap();

        assert_eq!(plan.results().len(), 1);
        assert!(plan.result_node("r0").is_some());
        assert_eq!(plan.resources().memory_bytes_quota, Some(i64::MAX));
        assert_eq!(plan.resources().concurrency_quota, Some(1));
    }

    #[test]
    fn plan_propagates_bounds_through_to_the_result() {
        let planner = Planner::new(vec![]);
        let plan = planner.plan(simple_plan(), &CancellationToken::new()).unwrap();
        let result = plan.result_node("r0").unwrap();
        assert!(result.bounds().is_some());
    }

    #[test]
    fn duplicate_yield_names_are_rejected() {
        let mut plan = Plan::new(0);
        let a = plan
            .add_root("a", ProcedureSpec::Yield(YieldSpec::new("dup")))
            .unwrap();
        let b = plan
            .add_root("b", ProcedureSpec::Yield(YieldSpec::new("dup")))
            .unwrap();
        let src1 = plan.add_node("s1", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        let src2 = plan.add_node("s2", ProcedureSpec::Source(SourceSpec::new("b"))).unwrap();
        plan.add_edge(src1, a).unwrap();
        plan.add_edge(src2, b).unwrap();

        let planner = Planner::new(vec![]);
        let err = planner.plan(plan, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, PlanError::Invalid(_)));
    }

    #[test]
    fn explicit_memory_quota_is_not_overridden() {
        let mut plan = simple_plan();
        *plan.resources_mut() = crate::plan::Resources {
            memory_bytes_quota: Some(42),
            concurrency_quota: None,
        };
        let planner = Planner::new(vec![PlannerOption::WithDefaultMemoryLimit(7)]);
        let plan = planner.plan(plan, &CancellationToken::new()).unwrap();
        assert_eq!(plan.resources().memory_bytes_quota, Some(42));
    }
}
