//! The heuristic rule engine: applies a batch of rewrite rules to a plan
//! repeatedly until a fixpoint, in the style of
//! [Apache Calcite](https://github.com/apache/calcite)'s `HepPlanner`.

pub mod engine;
pub mod graph;

pub use engine::{HeuristicEngine, MatchOrder};
pub use graph::{NodeId, PhysicalMeta, PlanGraph, PlanNode};
