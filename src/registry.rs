//! The process-wide procedure-spec registry: which procedure kinds exist,
//! and which physical rewrite rules apply to each.
//!
//! Built through an explicit constructor rather than populated by
//! module-load side effects, so construction order and failure are both
//! visible to the caller. [`ProcedureRegistry::with_defaults`] builds one
//! from scratch (the path [`crate::planner::Planner::new`] uses), and
//! [`DEFAULT_REGISTRY`] is a `lazy_static` singleton for callers that want a
//! shared instance without threading one through.

use std::collections::{HashMap, HashSet};

use crate::procedure::ProcedureKind;

/// Maps each procedure kind to the physical rewrite rules registered for
/// it, and guards against registering the same kind twice.
#[derive(Debug, Default)]
pub struct ProcedureRegistry {
    registered_kinds: HashSet<ProcedureKind>,
    rules_by_kind: HashMap<ProcedureKind, Vec<String>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind`. Panics if `kind` was already registered. This is
    /// a programming error, not a recoverable `PlanError`.
    pub fn register_kind(&mut self, kind: ProcedureKind) {
        if !self.registered_kinds.insert(kind) {
            panic!("procedure kind {kind} registered twice");
        }
    }

    pub fn register_rule_for_kind(&mut self, kind: ProcedureKind, rule_name: impl Into<String>) {
        self.rules_by_kind
            .entry(kind)
            .or_default()
            .push(rule_name.into());
    }

    pub fn is_registered(&self, kind: ProcedureKind) -> bool {
        self.registered_kinds.contains(&kind)
    }

    pub fn rules_for_kind(&self, kind: ProcedureKind) -> &[String] {
        self.rules_by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every procedure kind, with the push-down rules registered against
    /// the operator they fuse into a source.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in [
            ProcedureKind::Source,
            ProcedureKind::Range,
            ProcedureKind::Filter,
            ProcedureKind::Group,
            ProcedureKind::Aggregate,
            ProcedureKind::Yield,
        ] {
            registry.register_kind(kind);
        }
        registry.register_rule_for_kind(ProcedureKind::Range, "push_down_range");
        registry.register_rule_for_kind(ProcedureKind::Filter, "push_down_filter");
        registry.register_rule_for_kind(ProcedureKind::Group, "push_down_group");
        registry
    }
}

lazy_static! {
    /// A shared, once-initialized registry, for callers that don't want to
    /// construct their own.
    pub static ref DEFAULT_REGISTRY: ProcedureRegistry = ProcedureRegistry::with_defaults();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "registered twice")]
    fn registering_a_kind_twice_panics() {
        let mut registry = ProcedureRegistry::new();
        registry.register_kind(ProcedureKind::Source);
        registry.register_kind(ProcedureKind::Source);
    }

    #[test]
    fn defaults_cover_every_kind() {
        let registry = ProcedureRegistry::with_defaults();
        assert!(registry.is_registered(ProcedureKind::Yield));
        assert_eq!(registry.rules_for_kind(ProcedureKind::Range), ["push_down_range"]);
    }
}
