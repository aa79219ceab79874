use fnv::FnvHashSet;
use thiserror::Error;

use super::{Arc, ArcId, DirectedArc, Node, ROOT};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("a graph needs at least the root node")]
    Empty,
    #[error("arc {index} references node {node}, but there are only {node_count} nodes")]
    EndpointOutOfRange {
        index: usize,
        node: usize,
        node_count: usize,
    },
    #[error("arc {index} is a self-loop on node {node}")]
    SelfLoop { index: usize, node: usize },
    #[error("cannot allocate adjacency for {0} nodes")]
    TooManyNodes(usize),
}

/// The immutable directed graph a tree is selected from.
///
/// Each instance arc `i` becomes the forward arc `ArcId(i)`. Arcs not leaving the root also get a
/// reverse arc with the same weight. Reverse arcs are numbered `m, m+1, ..` in the order of their
/// forward arcs, which reproduces the `i + m - (n-1)` layout whenever the root's `n-1` arcs come
/// first in the data. No arc ever enters the root.
#[derive(Clone, Debug)]
pub struct Graph {
    node_count: usize,
    forward_count: usize,
    arcs: Vec<DirectedArc>,
    reverse: Vec<Option<ArcId>>,
    incoming: Vec<Vec<ArcId>>,
    outgoing: Vec<Vec<ArcId>>,
}

impl Graph {
    /// Builds the graph from the instance arcs, given in index order. An arc pointing into the root
    /// is turned around: instance arcs are edges, and the root may only be left.
    pub fn new(node_count: usize, arcs: Vec<Arc>) -> Result<Graph, GraphError> {
        if node_count == 0 {
            return Err(GraphError::Empty);
        }

        let forward_count = arcs.len();
        let mut forward = Vec::with_capacity(forward_count);
        for (index, arc) in arcs.into_iter().enumerate() {
            for node in [arc.tail, arc.head] {
                if node.0 >= node_count {
                    return Err(GraphError::EndpointOutOfRange {
                        index,
                        node: node.0,
                        node_count,
                    });
                }
            }
            if arc.tail == arc.head {
                return Err(GraphError::SelfLoop {
                    index,
                    node: arc.tail.0,
                });
            }
            let arc = if arc.head.is_root() { arc.reversed() } else { arc };
            forward.push(arc);
        }

        let mut directed: Vec<DirectedArc> = forward
            .iter()
            .enumerate()
            .map(|(ix, arc)| DirectedArc {
                id: ArcId(ix),
                tail: arc.tail,
                head: arc.head,
                weight: arc.weight,
            })
            .collect();

        let mut reverse = Vec::with_capacity(forward_count);
        for arc in forward.iter() {
            if arc.tail.is_root() {
                reverse.push(None);
                continue;
            }
            let id = ArcId(directed.len());
            let rev = arc.reversed();
            directed.push(DirectedArc {
                id,
                tail: rev.tail,
                head: rev.head,
                weight: rev.weight,
            });
            reverse.push(Some(id));
        }

        let mut incoming = adjacency(node_count)?;
        let mut outgoing = adjacency(node_count)?;
        for arc in directed.iter() {
            outgoing[arc.tail.0].push(arc.id);
            incoming[arc.head.0].push(arc.id);
        }

        Ok(Graph {
            node_count,
            forward_count,
            arcs: directed,
            reverse,
            incoming,
            outgoing,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The number of instance arcs, `m`.
    pub fn forward_count(&self) -> usize {
        self.forward_count
    }

    /// The number of directed arcs that get a decision variable: forward plus reverse.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn root(&self) -> Node {
        ROOT
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node> {
        (0..self.node_count).map(Node)
    }

    pub fn non_root_nodes(&self) -> impl Iterator<Item = Node> {
        (1..self.node_count).map(Node)
    }

    /// The directed arc for instance arc `index`, oriented as read (or away from the root).
    pub fn forward(&self, index: usize) -> ArcId {
        ArcId(index)
    }

    /// The opposite direction of instance arc `index`, if it has one.
    pub fn reverse(&self, index: usize) -> Option<ArcId> {
        self.reverse.get(index).copied().flatten()
    }

    pub fn arc(&self, id: ArcId) -> &DirectedArc {
        &self.arcs[id.0]
    }

    pub fn weight(&self, id: ArcId) -> u64 {
        self.arcs[id.0].weight
    }

    /// Weights of every directed arc, indexed by `ArcId`.
    pub fn weights(&self) -> Vec<u64> {
        self.arcs.iter().map(|a| a.weight).collect()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &DirectedArc> + '_ {
        self.arcs.iter()
    }

    /// Instance arcs between two non-root nodes, as (forward, reverse) pairs.
    pub fn inner_pairs(&self) -> impl Iterator<Item = (&DirectedArc, &DirectedArc)> + '_ {
        self.reverse
            .iter()
            .enumerate()
            .filter_map(move |(ix, rev)| rev.map(|rev| (&self.arcs[ix], &self.arcs[rev.0])))
    }

    pub fn incoming(&self, node: Node) -> &[ArcId] {
        &self.incoming[node.0]
    }

    pub fn outgoing(&self, node: Node) -> &[ArcId] {
        &self.outgoing[node.0]
    }

    /// Number of nodes reachable from the root, the root included. A k-cardinality tree exists
    /// iff this is at least k+1.
    pub fn reachable_count(&self) -> usize {
        let mut seen = FnvHashSet::default();
        let mut stack = vec![ROOT];
        seen.insert(ROOT);
        while let Some(node) = stack.pop() {
            for &id in self.outgoing(node) {
                let head = self.arcs[id.0].head;
                if seen.insert(head) {
                    stack.push(head);
                }
            }
        }
        seen.len()
    }
}

// The node count may come straight from a file header
fn adjacency(node_count: usize) -> Result<Vec<Vec<ArcId>>, GraphError> {
    let mut lists = Vec::new();
    lists
        .try_reserve_exact(node_count)
        .map_err(|_| GraphError::TooManyNodes(node_count))?;
    lists.resize(node_count, vec![]);
    Ok(lists)
}
