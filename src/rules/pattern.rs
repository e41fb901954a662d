//! Structural patterns over procedure kinds. Matching is structural, exact
//! on kind, and never inspects spec parameters: `Pat(K, child1, child2, ...)`
//! matches a node whose kind equals `K` and whose ordered predecessors match
//! the child patterns.

use crate::procedure::ProcedureKind;

/// A pattern over a plan subtree. A leaf `Pat(K)` (`children: None`) matches
/// any node of kind `K` regardless of its predecessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    kind: ProcedureKind,
    children: Option<Vec<Pattern>>,
}

impl Pattern {
    pub fn leaf(kind: ProcedureKind) -> Pattern {
        Pattern {
            kind,
            children: None,
        }
    }

    pub fn new(kind: ProcedureKind, children: Vec<Pattern>) -> Pattern {
        Pattern {
            kind,
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
        }
    }

    pub fn kind(&self) -> ProcedureKind {
        self.kind
    }

    pub fn children(&self) -> Option<&[Pattern]> {
        self.children.as_deref()
    }
}

/// `pat(RangeKind).child(pat(FromKind)).finish()` builder.
pub struct PatternBuilder {
    kind: ProcedureKind,
    children: Vec<Pattern>,
}

pub fn pat(kind: ProcedureKind) -> PatternBuilder {
    PatternBuilder {
        kind,
        children: Vec::new(),
    }
}

impl PatternBuilder {
    pub fn child(mut self, child: Pattern) -> Self {
        self.children.push(child);
        self
    }

    pub fn finish(self) -> Pattern {
        Pattern::new(self.kind, self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let p = Pattern::leaf(ProcedureKind::Source);
        assert_eq!(p.kind(), ProcedureKind::Source);
        assert!(p.children().is_none());
    }

    #[test]
    fn builder_nests_children() {
        let p = pat(ProcedureKind::Range)
            .child(Pattern::leaf(ProcedureKind::Source))
            .finish();
        assert_eq!(p.kind(), ProcedureKind::Range);
        assert_eq!(p.children().unwrap().len(), 1);
        assert_eq!(p.children().unwrap()[0].kind(), ProcedureKind::Source);
    }
}
