use std::fmt;

use super::Node;

/// An arc record as it appears in the instance data.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arc {
    pub tail: Node,
    pub head: Node,
    pub weight: u64,
}

impl Arc {
    pub fn new(tail: usize, head: usize, weight: u64) -> Arc {
        Arc {
            tail: Node(tail),
            head: Node(head),
            weight,
        }
    }

    pub(crate) fn reversed(&self) -> Arc {
        Arc {
            tail: self.head,
            head: self.tail,
            weight: self.weight,
        }
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:?}->{:?}, w={})", self.tail, self.head, self.weight)
    }
}

/// Position of a directed arc in the decision-variable space.
///
/// Forward arcs keep their instance index `0..m`. Reverse arcs follow at `m..`, so every
/// per-arc vector in a model (weights, x, f) is indexed by `ArcId`.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArcId(pub usize);

impl fmt::Debug for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A directed arc resolved against its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectedArc {
    pub id: ArcId,
    pub tail: Node,
    pub head: Node,
    pub weight: u64,
}

impl DirectedArc {
    pub fn touches_root(&self) -> bool {
        self.tail.is_root() || self.head.is_root()
    }
}
