/// An opaque predicate token. The concrete predicate language (tag
/// equality, regex, boolean expressions) is out of scope; what matters to
/// the planner is only that a predicate exists and can be carried, copied,
/// and absorbed by a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterPredicate(pub String);

impl FilterPredicate {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

/// A row filter.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub predicate: FilterPredicate,
}

impl FilterSpec {
    pub fn new(predicate: FilterPredicate) -> Self {
        Self { predicate }
    }
}
