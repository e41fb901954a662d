//! Time bounds and relative-duration resolution. A relative endpoint is
//! only ever resolved against `Plan::now` inside `compute_bounds`, never
//! earlier, so there is no ambiguity about which "now" a relative duration
//! is measured from.

use std::cmp::{max, min};

/// Absolute instant, nanoseconds since the Unix epoch. A plain `i64` (rather
/// than pulling in a calendar crate nothing else in the corpus depends on)
/// is enough: the planner only ever adds/subtracts/compares instants.
pub type Instant = i64;

/// An endpoint of a range window, either already absolute or relative to the
/// plan's `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBound {
    Absolute(Instant),
    /// Offset in nanoseconds from `now`. Negative for "in the past", which is
    /// the overwhelmingly common case (`-1h`).
    Relative(i64),
}

impl TimeBound {
    pub fn resolve(&self, now: Instant) -> Instant {
        match *self {
            TimeBound::Absolute(t) => t,
            TimeBound::Relative(offset) => now + offset,
        }
    }
}

/// A half-open `[start, stop)` window of absolute instants, resolved against
/// a plan's `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: TimeBound,
    pub stop: TimeBound,
}

impl RangeWindow {
    pub fn new(start: TimeBound, stop: TimeBound) -> Self {
        Self { start, stop }
    }

    pub fn resolve(&self, now: Instant) -> Bounds {
        let start = self.start.resolve(now);
        let stop = self.stop.resolve(now);
        if start >= stop {
            Bounds::Empty
        } else {
            Bounds::Window { start, stop }
        }
    }
}

/// The effective time window visible at a node: a half-open interval, the
/// sentinel *unbounded*, or the explicit *empty* window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bounds {
    Unbounded,
    Empty,
    Window { start: Instant, stop: Instant },
}

impl Bounds {
    /// Narrows `self` by intersecting with `window`, resolving `window`'s
    /// relative endpoints against `now`. Used by range nodes: bounds becomes
    /// the intersection of the predecessor's bounds with the node's own
    /// `[start, stop)` window.
    pub fn intersect_window(&self, window: &RangeWindow, now: Instant) -> Bounds {
        let resolved = window.resolve(now);
        self.intersect(&resolved)
    }

    pub fn intersect(&self, other: &Bounds) -> Bounds {
        match (self, other) {
            (Bounds::Empty, _) | (_, Bounds::Empty) => Bounds::Empty,
            (Bounds::Unbounded, b) => *b,
            (a, Bounds::Unbounded) => *a,
            (
                Bounds::Window { start: s1, stop: e1 },
                Bounds::Window { start: s2, stop: e2 },
            ) => {
                let start = max(*s1, *s2);
                let stop = min(*e1, *e2);
                if start >= stop {
                    Bounds::Empty
                } else {
                    Bounds::Window { start, stop }
                }
            }
        }
    }

    /// Union of two bounds, used to combine the bounds of multiple
    /// predecessors (the default combination rule unless an operator
    /// overrides it).
    pub fn union(&self, other: &Bounds) -> Bounds {
        match (self, other) {
            (Bounds::Unbounded, _) | (_, Bounds::Unbounded) => Bounds::Unbounded,
            (Bounds::Empty, b) => *b,
            (a, Bounds::Empty) => *a,
            (
                Bounds::Window { start: s1, stop: e1 },
                Bounds::Window { start: s2, stop: e2 },
            ) => Bounds::Window {
                start: min(*s1, *s2),
                stop: max(*e1, *e2),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Bounds::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_bound_resolves_against_now() {
        let window = RangeWindow::new(TimeBound::Relative(-1_000), TimeBound::Relative(0));
        assert_eq!(
            window.resolve(10_000),
            Bounds::Window {
                start: 9_000,
                stop: 10_000
            }
        );
    }

    #[test]
    fn intersect_narrows() {
        let outer = Bounds::Window {
            start: 1000,
            stop: 3000,
        };
        let window = RangeWindow::new(TimeBound::Absolute(1500), TimeBound::Absolute(2000));
        assert_eq!(
            outer.intersect_window(&window, 0),
            Bounds::Window {
                start: 1500,
                stop: 2000
            }
        );
    }

    #[test]
    fn intersect_with_unbounded_is_identity() {
        let window = RangeWindow::new(TimeBound::Absolute(1500), TimeBound::Absolute(2000));
        assert_eq!(
            Bounds::Unbounded.intersect_window(&window, 0),
            Bounds::Window {
                start: 1500,
                stop: 2000
            }
        );
    }

    #[test]
    fn empty_intersection_is_explicit() {
        let outer = Bounds::Window {
            start: 1000,
            stop: 1500,
        };
        let window = RangeWindow::new(TimeBound::Absolute(2000), TimeBound::Absolute(3000));
        assert_eq!(outer.intersect_window(&window, 0), Bounds::Empty);
    }

    #[test]
    fn union_widens() {
        let a = Bounds::Window {
            start: 1000,
            stop: 2000,
        };
        let b = Bounds::Window {
            start: 1500,
            stop: 3000,
        };
        assert_eq!(
            a.union(&b),
            Bounds::Window {
                start: 1000,
                stop: 3000
            }
        );
    }
}
