use crate::instance::Graph;
use crate::model::{LinExpr, Var};
use crate::model_builder::ModelBuilder;

use super::shared::TreeVars;

/// Multi-commodity flow: commodity `c` carries one unit from the root to node `c` whenever `c` is
/// spanned, over selected arcs only. Returns `f[c - 1][arc]` for every non-root `c`.
pub(super) fn emit(mb: &mut ModelBuilder, graph: &Graph, vars: &TreeVars) -> Vec<Vec<Var>> {
    let mut flows = Vec::with_capacity(graph.node_count().saturating_sub(1));

    for commodity in graph.non_root_nodes() {
        let c = commodity.0;
        let f: Vec<Var> = graph
            .arcs()
            .map(|arc| mb.continuous(&format!("f_{{{},{},{}}}", arc.tail.0, arc.head.0, c), 0.0, 1.0))
            .collect();

        for node in graph.nodes() {
            let outflow = LinExpr::sum(graph.outgoing(node).iter().map(|id| f[id.0]));
            let inflow = LinExpr::sum(graph.incoming(node).iter().map(|id| f[id.0]));
            let name = format!("flow_{}_{}", c, node.0);
            if node.is_root() {
                mb.eq(name, outflow - inflow, vars.y[c]);
            } else if node == commodity {
                mb.eq(name, inflow - outflow, vars.y[c]);
            } else {
                mb.eq(name, inflow - outflow, 0.0);
            }
        }

        for arc in graph.arcs() {
            mb.le(
                format!("capacity_{}_{}_{}", arc.tail.0, arc.head.0, c),
                f[arc.id.0],
                vars.x[arc.id.0],
            );
        }

        flows.push(f);
    }

    flows
}
