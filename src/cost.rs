//! Self-cost and input statistics. Concrete cost models (cost-based plan
//! search) are out of scope; what remains is the *shape* of the cost
//! capability every physical `ProcedureSpec` exposes.

use derive_more::{Add, From, Into};

/// Opaque per-node cost estimate. Only relative ordering matters; the
/// planner never inspects the magnitude beyond summation.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, From, Into, Add)]
pub struct Cost(pub f64);

/// Output statistics of a node, consumed as input statistics by its
/// successor's `cost` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Statistics {
    pub row_count: Option<u64>,
}

impl Statistics {
    pub fn unknown() -> Self {
        Self { row_count: None }
    }
}
