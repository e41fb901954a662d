use crate::procedure::{FilterPredicate, GroupSpec};
use crate::time::RangeWindow;

/// The table/bucket source: a bucket, optionally an org, and, once a
/// push-down rule has fired, an absorbed range window, predicate, or set of
/// group keys.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSpec {
    pub bucket: String,
    pub org: Option<String>,
    pub range: Option<RangeWindow>,
    pub predicate: Option<FilterPredicate>,
    pub group_keys: Option<Vec<String>>,
}

impl SourceSpec {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            org: None,
            range: None,
            predicate: None,
            group_keys: None,
        }
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Returns a copy with `window` absorbed, for use by
    /// `PushDownRangeRule`. Panics if a range is already absorbed; callers
    /// must check `self.range.is_none()` first (the rule's idempotence
    /// check).
    pub fn with_absorbed_range(&self, window: RangeWindow) -> Self {
        debug_assert!(self.range.is_none(), "source already carries a range");
        let mut copy = self.clone();
        copy.range = Some(window);
        copy
    }

    pub fn with_absorbed_predicate(&self, predicate: FilterPredicate) -> Self {
        debug_assert!(self.predicate.is_none(), "source already carries a predicate");
        let mut copy = self.clone();
        copy.predicate = Some(predicate);
        copy
    }

    pub fn with_absorbed_group(&self, group: &GroupSpec) -> Self {
        debug_assert!(self.group_keys.is_none(), "source already carries group keys");
        let mut copy = self.clone();
        copy.group_keys = Some(group.keys.clone());
        copy
    }
}
