/// A terminal operator binding a named result to its predecessor's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YieldSpec {
    pub name: String,
}

impl YieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The reserved default yield name used when a root is not itself a yield
/// node.
pub const DEFAULT_YIELD_NAME: &str = "_result";
