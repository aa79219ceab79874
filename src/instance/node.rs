use std::fmt;

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Node(pub usize);

/// Every tree is rooted here. The root never receives an arc.
pub const ROOT: Node = Node(0);

impl Node {
    pub fn is_root(&self) -> bool {
        *self == ROOT
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
