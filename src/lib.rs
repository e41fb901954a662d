//! ## Background
//!
//! A physical query planner for a dataflow-style time-series query engine.
//! It accepts an unoptimized logical plan, a DAG of procedure nodes rather
//! than a single-rooted expression tree, and produces a physical plan ready
//! for an execution engine, by applying a heuristic, rule-driven rewriter to
//! a fixpoint.
//!
//! Rule based optimization is relatively simple: apply a collection of
//! rewrite rules to a plan repeatedly until some condition is met, for
//! example a fixpoint (the plan no longer changes) or a bound on the number
//! of passes. Each rule is a substitution: the engine swaps a rule-generated
//! replacement in for the matched subgraph, and the replacement should
//! behave the same as the original while being cheaper to execute. This is
//! especially effective for the kind of push-down rewrites this planner
//! specializes in: fusing a downstream range, filter, or grouping stage into
//! the source that feeds it, since a source typically pushes that work down
//! to wherever the underlying data already lives.
//!
//! Cost-based search over the full plan space is out of scope: the rule set
//! here is heuristic and applied greedily, not chosen by comparing the cost
//! of alternative plans.
//!
//! ## Design
//!
//! ### Heuristic engine
//!
//! [`heuristic::HeuristicEngine`] runs a batch of rules over a
//! [`plan::Plan`]'s graph, visiting every node once per pass in a
//! deterministic order and applying at most one rule per node, until a full
//! pass makes no further changes or a pass bound is hit.
//!
//! ### Physical planning pass
//!
//! [`planner::Planner`] orchestrates the whole pass: run the heuristic
//! engine, resolve yield nodes into named results, propagate time bounds
//! bottom-up, and fill in resource quota defaults.

#[macro_use]
extern crate lazy_static;

pub mod bounds;
pub mod cancellation;
pub mod cost;
pub mod error;
pub mod heuristic;
pub mod plan;
pub mod planner;
pub mod procedure;
pub mod properties;
pub mod registry;
pub mod rules;
pub mod time;
