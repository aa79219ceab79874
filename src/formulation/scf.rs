use crate::instance::Graph;
use crate::model::{LinExpr, Var};
use crate::model_builder::ModelBuilder;

use super::shared::{arc_name, TreeVars};

/// Single-commodity flow: the root ships k units, every spanned node keeps one, and flow only
/// moves over selected arcs. Returns the flow variable of every directed arc.
pub(super) fn emit(mb: &mut ModelBuilder, graph: &Graph, k: usize, vars: &TreeVars) -> Vec<Var> {
    let kf = k as f64;

    let f: Vec<Var> = graph
        .arcs()
        .map(|arc| mb.continuous(&arc_name("f", arc), 0.0, kf))
        .collect();

    mb.eq(
        "root_supply",
        LinExpr::sum(graph.outgoing(graph.root()).iter().map(|id| f[id.0])),
        kf,
    );

    for node in graph.non_root_nodes() {
        let inflow = LinExpr::sum(graph.incoming(node).iter().map(|id| f[id.0]));
        let outflow = LinExpr::sum(graph.outgoing(node).iter().map(|id| f[id.0]));
        mb.eq(format!("flow_{}", node.0), inflow - outflow, vars.y[node.0]);
    }

    for arc in graph.arcs() {
        mb.le(
            format!("capacity_{}_{}", arc.tail.0, arc.head.0),
            f[arc.id.0],
            kf * vars.x[arc.id.0],
        );
    }

    f
}
