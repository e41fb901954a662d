use crate::time::RangeWindow;

/// A windowing/range selection. Narrows the bounds of whatever it sits atop
/// and is the downstream half of the range-into-source push-down.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeSpec {
    pub window: RangeWindow,
}

impl RangeSpec {
    pub fn new(window: RangeWindow) -> Self {
        Self { window }
    }
}
