use crate::instance::{DirectedArc, Graph, Node};
use crate::model::{LinExpr, Var};
use crate::model_builder::ModelBuilder;

/// Selection variables every formulation shares: `x` per directed arc, `y` per node.
#[derive(Clone, Debug)]
pub(super) struct TreeVars {
    pub(super) x: Vec<Var>,
    pub(super) y: Vec<Var>,
}

pub(super) fn arc_name(prefix: &str, arc: &DirectedArc) -> String {
    format!("{}_{{{},{}}}", prefix, arc.tail.0, arc.head.0)
}

pub(super) fn declare(mb: &mut ModelBuilder, graph: &Graph) -> TreeVars {
    let x = graph
        .arcs()
        .map(|arc| mb.binary(&arc_name("x", arc)))
        .collect();
    let y = graph
        .nodes()
        .map(|node| mb.binary(&format!("y_{}", node.0)))
        .collect();
    TreeVars { x, y }
}

/// Objective plus the constraints shared by every formulation: tree size, one parent per spanned
/// node, one arc out of the root and arc/node linking.
pub(super) fn emit_tree_core(mb: &mut ModelBuilder, graph: &Graph, k: usize, vars: &TreeVars) {
    mb.minimize(LinExpr::weighted_sum(
        graph.arcs().map(|arc| (vars.x[arc.id.0], arc.weight as f64)),
    ));

    mb.eq("span", LinExpr::sum(vars.y.iter().copied()), (k + 1) as f64);
    mb.eq("select", LinExpr::sum(vars.x.iter().copied()), k as f64);

    for node in graph.non_root_nodes() {
        mb.eq(
            format!("in_degree_{}", node.0),
            LinExpr::sum(graph.incoming(node).iter().map(|id| vars.x[id.0])),
            vars.y[node.0],
        );
    }

    mb.eq(
        "root_out",
        LinExpr::sum(graph.outgoing(graph.root()).iter().map(|id| vars.x[id.0])),
        1.0,
    );

    for (fwd, rev) in graph.inner_pairs() {
        mb.ge(
            format!("link_{}_{}", fwd.tail.0, fwd.head.0),
            vars.y[fwd.tail.0] + vars.y[fwd.head.0],
            2.0 * (vars.x[fwd.id.0] + vars.x[rev.id.0]),
        );
    }
}

/// The root is always spanned and, when ranks are used, sits at rank zero. Root arcs need no
/// handling here: the graph never carries an arc into the root.
pub(super) fn fix_root(mb: &mut ModelBuilder, vars: &TreeVars, root: Node, rank: Option<Var>) {
    mb.eq("root_spanned", vars.y[root.0], 1.0);
    if let Some(rank) = rank {
        mb.eq("root_rank", rank, 0.0);
    }
}
