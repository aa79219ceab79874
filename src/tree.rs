use fnv::FnvHashMap;
use thiserror::Error;

use crate::instance::{ArcId, Graph, Node, ROOT};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("expected {expected} arcs, found {found}")]
    WrongArcCount { expected: usize, found: usize },
    #[error("arc {0:?} enters the root")]
    EntersRoot(ArcId),
    #[error("{0:?} has more than one parent")]
    TwoParents(Node),
    #[error("the root must have exactly one child, it has {0}")]
    RootDegree(usize),
    #[error("{0:?} is not reachable from the root")]
    Unreachable(Node),
}

type Result<T> = std::result::Result<T, TreeError>;

/// A k-cardinality tree: k arcs forming an arborescence over k+1 nodes, hanging from the root
/// through a single root arc.
#[derive(Clone, Debug)]
pub struct KTree {
    arcs: Vec<ArcId>,
    // Nodes in breadth-first order, the root first
    nodes: Vec<Node>,
    parent: FnvHashMap<Node, ArcId>,
    depth: FnvHashMap<Node, usize>,
}

impl KTree {
    pub fn from_arcs(graph: &Graph, arcs: &[ArcId], k: usize) -> Result<KTree> {
        if arcs.len() != k {
            return Err(TreeError::WrongArcCount {
                expected: k,
                found: arcs.len(),
            });
        }

        let mut parent = FnvHashMap::default();
        let mut children: FnvHashMap<Node, Vec<Node>> = FnvHashMap::default();
        for &id in arcs {
            let arc = graph.arc(id);
            if arc.head.is_root() {
                return Err(TreeError::EntersRoot(id));
            }
            if parent.insert(arc.head, id).is_some() {
                return Err(TreeError::TwoParents(arc.head));
            }
            children.entry(arc.tail).or_default().push(arc.head);
        }

        let root_degree = children.get(&ROOT).map_or(0, |c| c.len());
        if root_degree != 1 {
            return Err(TreeError::RootDegree(root_degree));
        }

        let mut nodes = vec![ROOT];
        let mut depth = FnvHashMap::default();
        depth.insert(ROOT, 0);
        let mut next = 0;
        while next < nodes.len() {
            let node = nodes[next];
            next += 1;
            for &child in children.get(&node).into_iter().flatten() {
                depth.insert(child, depth[&node] + 1);
                nodes.push(child);
            }
        }

        // k distinct heads: anything not reached hangs off a cycle
        if let Some(&lost) = parent.keys().filter(|n| !depth.contains_key(*n)).min() {
            return Err(TreeError::Unreachable(lost));
        }

        Ok(KTree {
            arcs: arcs.to_vec(),
            nodes,
            parent,
            depth,
        })
    }

    pub fn arcs(&self) -> &[ArcId] {
        &self.arcs
    }

    /// Spanned nodes, root first, parents before children.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn contains(&self, node: Node) -> bool {
        self.depth.contains_key(&node)
    }

    pub fn parent_arc(&self, node: Node) -> Option<ArcId> {
        self.parent.get(&node).copied()
    }

    /// Arc count on the path from the root; `None` off the tree.
    pub fn depth(&self, node: Node) -> Option<usize> {
        self.depth.get(&node).copied()
    }

    /// Arcs from the root down to `node`, root arc first.
    pub fn path_to(&self, graph: &Graph, node: Node) -> Vec<ArcId> {
        let mut path = vec![];
        let mut at = node;
        while let Some(id) = self.parent_arc(at) {
            path.push(id);
            at = graph.arc(id).tail;
        }
        path.reverse();
        path
    }

    /// Number of tree nodes below and including `node`.
    pub fn subtree_size(&self, graph: &Graph, node: Node) -> usize {
        self.nodes
            .iter()
            .filter(|&&n| self.path_to(graph, n).iter().any(|&id| graph.arc(id).head == node))
            .count()
    }

    pub fn weight(&self, graph: &Graph) -> u64 {
        self.arcs.iter().map(|&id| graph.weight(id)).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instance::Arc;

    fn small_graph() -> Graph {
        // reverse arcs: 5 = (2,1), 6 = (3,1), 7 = (3,2)
        Graph::new(
            4,
            vec![
                Arc::new(0, 1, 1),
                Arc::new(0, 2, 5),
                Arc::new(1, 2, 1),
                Arc::new(1, 3, 2),
                Arc::new(2, 3, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_path_tree() {
        let g = small_graph();
        let tree = KTree::from_arcs(&g, &[ArcId(2), ArcId(0), ArcId(4)], 3).unwrap();
        assert_eq!(tree.nodes(), &[ROOT, Node(1), Node(2), Node(3)]);
        assert_eq!(tree.depth(Node(3)), Some(3));
        assert_eq!(tree.path_to(&g, Node(3)), vec![ArcId(0), ArcId(2), ArcId(4)]);
        assert_eq!(tree.subtree_size(&g, Node(1)), 3);
        assert_eq!(tree.subtree_size(&g, Node(3)), 1);
        assert_eq!(tree.weight(&g), 3);
    }

    #[test]
    fn test_branching_tree() {
        let g = small_graph();
        let tree = KTree::from_arcs(&g, &[ArcId(0), ArcId(2), ArcId(3)], 3).unwrap();
        assert_eq!(tree.depth(Node(2)), Some(2));
        assert_eq!(tree.depth(Node(3)), Some(2));
        assert_eq!(tree.subtree_size(&g, Node(1)), 3);
        assert!(!tree.contains(Node(4)));
    }

    #[test]
    fn test_rejects_non_trees() {
        let g = small_graph();
        assert_eq!(
            KTree::from_arcs(&g, &[ArcId(0)], 2).unwrap_err(),
            TreeError::WrongArcCount {
                expected: 2,
                found: 1
            }
        );
        // two ways into 2
        assert_eq!(
            KTree::from_arcs(&g, &[ArcId(0), ArcId(1), ArcId(2)], 3).unwrap_err(),
            TreeError::TwoParents(Node(2))
        );
        // root has no child
        assert_eq!(
            KTree::from_arcs(&g, &[ArcId(2), ArcId(4)], 2).unwrap_err(),
            TreeError::RootDegree(0)
        );
        // 0->2 plus a 1<->3 cycle
        assert_eq!(
            KTree::from_arcs(&g, &[ArcId(1), ArcId(3), ArcId(6)], 3).unwrap_err(),
            TreeError::Unreachable(Node(1))
        );
    }
}
