/// A grouping by tag key.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSpec {
    pub keys: Vec<String>,
}

impl GroupSpec {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}
