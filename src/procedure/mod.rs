//! Procedure specs: the payload every plan node carries.
//!
//! Modeled as one closed `ProcedureSpec` enum covering every procedure kind,
//! downcast via `enum-as-inner`, rather than a logical/physical
//! trait-object split. Concrete per-kind payloads are kept in their own
//! submodules, one file per operator.

mod aggregate;
mod filter;
mod group;
mod range;
mod source;
mod yield_spec;

pub use aggregate::{AggregateOp, AggregateSpec};
pub use filter::{FilterPredicate, FilterSpec};
pub use group::GroupSpec;
pub use range::RangeSpec;
pub use source::SourceSpec;
pub use yield_spec::{YieldSpec, DEFAULT_YIELD_NAME};

use enum_as_inner::EnumAsInner;

use crate::cost::{Cost, Statistics};
use crate::time::RangeWindow;

/// The tag identifying a node's operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcedureKind {
    Source,
    Range,
    Filter,
    Group,
    Aggregate,
    Yield,
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcedureKind::Source => "source",
            ProcedureKind::Range => "range",
            ProcedureKind::Filter => "filter",
            ProcedureKind::Group => "group",
            ProcedureKind::Aggregate => "aggregate",
            ProcedureKind::Yield => "yield",
        };
        f.write_str(name)
    }
}

/// An opaque, kind-tagged operation. Exposes its kind, a deep copy (for
/// free, since the enum and all its payloads are `Clone`), and, for kinds
/// that carry a range window, the window a push-down rule can absorb.
#[derive(Clone, Debug, PartialEq, EnumAsInner)]
pub enum ProcedureSpec {
    Source(SourceSpec),
    Range(RangeSpec),
    Filter(FilterSpec),
    Group(GroupSpec),
    Aggregate(AggregateSpec),
    Yield(YieldSpec),
}

impl ProcedureSpec {
    pub fn kind(&self) -> ProcedureKind {
        match self {
            ProcedureSpec::Source(_) => ProcedureKind::Source,
            ProcedureSpec::Range(_) => ProcedureKind::Range,
            ProcedureSpec::Filter(_) => ProcedureKind::Filter,
            ProcedureSpec::Group(_) => ProcedureKind::Group,
            ProcedureSpec::Aggregate(_) => ProcedureKind::Aggregate,
            ProcedureSpec::Yield(_) => ProcedureKind::Yield,
        }
    }

    /// Deep copy. Trivial here since every payload is plain data, but kept
    /// as an explicit method rather than relying on callers reaching for
    /// `Clone` directly.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// The bound result name, for yield-capable specs; `None` otherwise.
    pub fn yield_name(&self) -> Option<&str> {
        match self {
            ProcedureSpec::Yield(y) => Some(y.name.as_str()),
            _ => None,
        }
    }

    /// Self-cost given predecessor statistics. Concrete cost models are out
    /// of scope; every kind charges a trivial unit cost and passes
    /// statistics through unchanged.
    pub fn self_cost(&self, in_stats: &[Statistics]) -> (Cost, Statistics) {
        let out = in_stats.first().copied().unwrap_or_else(Statistics::unknown);
        (Cost(1.0), out)
    }

    /// The range window already absorbed into a source, if any. Used by
    /// `PushDownRangeRule` to decide whether a source can still absorb a
    /// range: if it already carries one, the rule is a no-op.
    pub fn absorbed_range(&self) -> Option<&RangeWindow> {
        match self {
            ProcedureSpec::Source(s) => s.range.as_ref(),
            _ => None,
        }
    }
}
