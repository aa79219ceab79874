// The `instance` module contains the graph the trees are selected from. These types are immutable.
mod node;
pub use crate::instance::node::{Node, ROOT};

mod arc;
pub use crate::instance::arc::{Arc, ArcId, DirectedArc};

mod graph;
pub use crate::instance::graph::{Graph, GraphError};
