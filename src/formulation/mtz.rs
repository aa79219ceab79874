use crate::instance::Graph;
use crate::model::Var;
use crate::model_builder::ModelBuilder;

use super::shared::TreeVars;

/// Miller-Tucker-Zemlin ranks: `u_v` grows by at least one along every selected arc, so no
/// selected cycle can close. Returns the rank variable of every node.
pub(super) fn emit(mb: &mut ModelBuilder, graph: &Graph, k: usize, vars: &TreeVars) -> Vec<Var> {
    // Ranks never exceed k, so k is enough to switch a propagation row off. k-1 is not: it cuts
    // trees whose deepest node has rank k.
    let big_m = k as f64;
    let kf = k as f64;

    let u: Vec<Var> = graph
        .nodes()
        .map(|node| mb.continuous(&format!("u_{}", node.0), 0.0, kf))
        .collect();

    for node in graph.non_root_nodes() {
        let v = node.0;
        mb.le(format!("rank_upper_{}", v), u[v], kf * vars.y[v]);
        mb.ge(format!("rank_lower_{}", v), u[v], vars.y[v]);
    }

    for (fwd, rev) in graph.inner_pairs() {
        for arc in [fwd, rev] {
            let (t, h) = (arc.tail.0, arc.head.0);
            let x = vars.x[arc.id.0];
            mb.le(
                format!("rank_{}_{}", t, h),
                u[t] + x,
                u[h] + big_m * (1.0 - x),
            );
        }
    }

    u
}
