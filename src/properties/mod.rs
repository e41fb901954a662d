//! Physical attributes carried by a node once it has been planned: a set of
//! named attributes (e.g. `"range"`, `"group_keys"`) that a source has
//! already absorbed, giving push-down rules enough to reason about what a
//! node provides without a full collation/partitioning model.

use std::collections::BTreeSet;

/// The set of physical attributes a node requires from its inputs, or
/// provides to its consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicalAttributes(BTreeSet<String>);

impl PhysicalAttributes {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, attr: impl Into<String>) -> Self {
        self.0.insert(attr.into());
        self
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.0.contains(attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
