// The `formulation` module turns a graph and a cardinality into a mixed-integer model. All three
// variants share the selection core and differ only in how they rule out cycles.
mod shared;
mod mcf;
mod mtz;
mod scf;

use std::{fmt, str::FromStr};

use log::info;
use thiserror::Error;

use crate::instance::{ArcId, Graph, Node};
use crate::metrics;
use crate::model::{Assignment, Model, Var};
use crate::model_builder::ModelBuilder;
use crate::tree::KTree;

use self::shared::TreeVars;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelConstructionError {
    #[error("cardinality k={k} must satisfy 1 <= k < {n}")]
    InvalidCardinality { k: usize, n: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown formulation {0:?}, expected one of MTZ, SCF, MCF")]
pub struct UnknownFormulation(String);

type Result<T> = std::result::Result<T, ModelConstructionError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Formulation {
    /// Rank variables per node (Miller-Tucker-Zemlin).
    Mtz,
    /// One flow commodity shipped from the root.
    Scf,
    /// One flow commodity per non-root node.
    Mcf,
}

impl Formulation {
    pub const ALL: [Formulation; 3] = [Formulation::Mtz, Formulation::Scf, Formulation::Mcf];

    pub fn name(&self) -> &'static str {
        match self {
            Formulation::Mtz => "MTZ",
            Formulation::Scf => "SCF",
            Formulation::Mcf => "MCF",
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Formulation {
    type Err = UnknownFormulation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Formulation::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormulation(s.to_string()))
    }
}

/// Cycle-breaking variables, by formulation.
#[derive(Clone, Debug)]
pub enum SubtourVars {
    /// `u[node]`
    Rank(Vec<Var>),
    /// `f[arc]`
    Flow(Vec<Var>),
    /// `f[commodity - 1][arc]`
    Commodity(Vec<Vec<Var>>),
}

/// A built model together with handles to its variables.
#[derive(Clone, Debug)]
pub struct TreeModel {
    pub formulation: Formulation,
    pub k: usize,
    pub model: Model,
    vars: TreeVars,
    subtour: SubtourVars,
}

impl TreeModel {
    pub fn x(&self, arc: ArcId) -> Var {
        self.vars.x[arc.0]
    }

    pub fn y(&self, node: Node) -> Var {
        self.vars.y[node.0]
    }

    pub fn subtour_vars(&self) -> &SubtourVars {
        &self.subtour
    }

    pub fn selected_arcs(&self, assignment: &Assignment) -> Vec<ArcId> {
        (0..self.vars.x.len())
            .filter(|&ix| assignment.is_set(self.vars.x[ix]))
            .map(ArcId)
            .collect()
    }

    pub fn spanned_nodes(&self, assignment: &Assignment) -> Vec<Node> {
        (0..self.vars.y.len())
            .filter(|&ix| assignment.is_set(self.vars.y[ix]))
            .map(Node)
            .collect()
    }

    /// The full variable assignment that encodes `tree`, e.g. to check it against the model or to
    /// hand an oracle a starting point.
    pub fn assignment_for(&self, graph: &Graph, tree: &KTree) -> Assignment {
        let mut values = vec![0.0; self.model.num_vars()];
        for &id in tree.arcs() {
            values[self.x(id).0] = 1.0;
        }
        for &node in tree.nodes() {
            values[self.y(node).0] = 1.0;
        }

        match &self.subtour {
            SubtourVars::Rank(u) => {
                for &node in tree.nodes() {
                    values[u[node.0].0] = tree.depth(node).unwrap_or(0) as f64;
                }
            }
            SubtourVars::Flow(f) => {
                for &id in tree.arcs() {
                    let head = graph.arc(id).head;
                    values[f[id.0].0] = tree.subtree_size(graph, head) as f64;
                }
            }
            SubtourVars::Commodity(f) => {
                for &node in tree.nodes().iter().filter(|n| !n.is_root()) {
                    for id in tree.path_to(graph, node) {
                        values[f[node.0 - 1][id.0].0] = 1.0;
                    }
                }
            }
        }
        Assignment::new(values)
    }
}

/// Emits the model for one (graph, k, formulation) triple.
#[derive(Clone, Copy, Debug)]
pub struct FormulationBuilder<'g> {
    graph: &'g Graph,
    formulation: Formulation,
    k: usize,
}

impl<'g> FormulationBuilder<'g> {
    pub fn new(graph: &'g Graph, formulation: Formulation, k: usize) -> Result<Self> {
        let n = graph.node_count();
        if k < 1 || k >= n {
            return Err(ModelConstructionError::InvalidCardinality { k, n });
        }
        Ok(FormulationBuilder {
            graph,
            formulation,
            k,
        })
    }

    pub fn build(&self) -> TreeModel {
        let (graph, k) = (self.graph, self.k);
        info!("loading {} (k={})", self.formulation, k);

        let mut mb = ModelBuilder::new();
        let vars = shared::declare(&mut mb, graph);
        shared::emit_tree_core(&mut mb, graph, k, &vars);

        let subtour = match self.formulation {
            Formulation::Mtz => SubtourVars::Rank(mtz::emit(&mut mb, graph, k, &vars)),
            Formulation::Scf => SubtourVars::Flow(scf::emit(&mut mb, graph, k, &vars)),
            Formulation::Mcf => SubtourVars::Commodity(mcf::emit(&mut mb, graph, &vars)),
        };
        let root_rank = match &subtour {
            SubtourVars::Rank(u) => Some(u[graph.root().0]),
            _ => None,
        };
        shared::fix_root(&mut mb, &vars, graph.root(), root_rank);

        let model = mb.build();
        info!(
            "{} model: {} variables ({} binary), {} constraints",
            self.formulation,
            model.num_vars(),
            model.num_integers(),
            model.num_constraints()
        );
        metrics::record_build(self.formulation, &model);

        TreeModel {
            formulation: self.formulation,
            k,
            model,
            vars,
            subtour,
        }
    }
}

/// Shorthand for `FormulationBuilder::new(..)?.build()`.
pub fn build(graph: &Graph, formulation: Formulation, k: usize) -> Result<TreeModel> {
    Ok(FormulationBuilder::new(graph, formulation, k)?.build())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instance::{Arc, ROOT};
    use itertools::Itertools;

    fn small_graph() -> Graph {
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

    fn five_node_graph() -> Graph {
        Graph::new(
            5,
            vec![
                Arc::new(0, 1, 3),
                Arc::new(0, 2, 1),
                Arc::new(0, 3, 4),
                Arc::new(1, 2, 2),
                Arc::new(2, 3, 7),
                Arc::new(3, 4, 1),
                Arc::new(1, 4, 5),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_cardinality() {
        let g = small_graph();
        for k in [0, 4, 9] {
            for formulation in Formulation::ALL {
                assert_eq!(
                    build(&g, formulation, k).unwrap_err(),
                    ModelConstructionError::InvalidCardinality { k, n: 4 }
                );
            }
        }
    }

    #[test]
    fn test_variable_counts() {
        let g = small_graph();
        let count = |f| build(&g, f, 2).unwrap().model.num_vars();
        // 8 arcs, 4 nodes
        assert_eq!(count(Formulation::Mtz), 8 + 4 + 4);
        assert_eq!(count(Formulation::Scf), 8 + 4 + 8);
        assert_eq!(count(Formulation::Mcf), 8 + 4 + 8 * 3);
        for f in Formulation::ALL {
            assert_eq!(build(&g, f, 2).unwrap().model.num_integers(), 12);
        }
    }

    #[test]
    fn test_no_variable_enters_root() {
        let g = small_graph();
        for f in Formulation::ALL {
            let tm = build(&g, f, 3).unwrap();
            for tail in 1..4 {
                assert_eq!(tm.model.var_by_name(&format!("x_{{{},0}}", tail)), None);
                assert_eq!(tm.model.var_by_name(&format!("f_{{{},0}}", tail)), None);
            }
            assert!(tm.model.var_by_name("x_{0,1}").is_some());
            assert!(tm.model.var_by_name("x_{2,1}").is_some());
        }
    }

    #[test]
    fn test_root_is_fixed() {
        let g = small_graph();
        for f in Formulation::ALL {
            let tm = build(&g, f, 2).unwrap();
            let spanned = tm.model.constraint("root_spanned").unwrap();
            assert_eq!(spanned.lhs.terms(), &[(tm.y(ROOT), 1.0)]);
            assert_eq!(spanned.rhs, 1.0);
            assert_eq!(tm.model.constraint("root_rank").is_some(), f == Formulation::Mtz);
        }
        let mtz = build(&g, Formulation::Mtz, 2).unwrap();
        let u0 = mtz.model.var_by_name("u_0").unwrap();
        assert_eq!(mtz.model.constraint("root_rank").unwrap().lhs.terms(), &[(u0, 1.0)]);
    }

    #[test]
    fn test_mtz_propagation_uses_k() {
        let g = small_graph();
        let tm = build(&g, Formulation::Mtz, 3).unwrap();
        let row = tm.model.constraint("rank_1_2").unwrap();
        let x = tm.model.var_by_name("x_{1,2}").unwrap();
        // u_1 + x - u_2 - 3(1 - x) <= 0  =>  u_1 - u_2 + 4x <= 3
        assert_eq!(row.rhs, 3.0);
        assert!(row.lhs.terms().contains(&(x, 4.0)));
        // root arcs carry no propagation row
        assert!(tm.model.constraint("rank_0_1").is_none());
    }

    #[test]
    fn test_every_tree_is_feasible_in_every_formulation() {
        let g = five_node_graph();
        for k in 1..g.node_count() {
            let trees = (0..g.arc_count())
                .map(ArcId)
                .combinations(k)
                .filter_map(|arcs| KTree::from_arcs(&g, &arcs, k).ok())
                .collect_vec();
            assert!(!trees.is_empty());

            for f in Formulation::ALL {
                let tm = build(&g, f, k).unwrap();
                for tree in trees.iter() {
                    let point = tm.assignment_for(&g, tree);
                    assert_eq!(
                        tm.model.violations(&point, 1e-9),
                        Vec::<String>::new(),
                        "{} k={} tree {:?}",
                        f,
                        k,
                        tree.arcs()
                    );
                    assert_eq!(tm.model.objective_value(&point), tree.weight(&g) as f64);
                    assert_eq!(tm.selected_arcs(&point), tree.arcs().iter().copied().sorted().collect_vec());
                    assert_eq!(tm.spanned_nodes(&point).len(), k + 1);
                }
            }
        }
    }

    #[test]
    fn test_cycles_are_cut_off() {
        // 0->2 plus the 1<->3 two-cycle has the right arc and node counts but is no tree
        let g = small_graph();
        let tm = build(&g, Formulation::Mtz, 3).unwrap();
        let mut values = vec![0.0; tm.model.num_vars()];
        for id in [ArcId(1), ArcId(3), ArcId(6)] {
            values[tm.x(id).0] = 1.0;
        }
        for v in 0..4 {
            values[tm.y(Node(v)).0] = 1.0;
        }
        let broken = tm.model.violations(&Assignment::new(values), 1e-9);
        assert!(broken.iter().any(|name| name == "link_1_3"));
    }

    // A cheap triangle 2->3->4->2 behind an expensive root arc. Root arc plus triangle passes the
    // degree and link rows for k=4, so only the cycle rows of each formulation reject it.
    fn triangle_graph() -> Graph {
        Graph::new(
            5,
            vec![
                Arc::new(0, 1, 10),
                Arc::new(1, 2, 10),
                Arc::new(2, 3, 1),
                Arc::new(3, 4, 1),
                Arc::new(4, 2, 1),
            ],
        )
        .unwrap()
    }

    /// Selects (0,1) and the triangle, spanning every node.
    fn root_arc_plus_triangle(tm: &TreeModel) -> Vec<f64> {
        let mut values = vec![0.0; tm.model.num_vars()];
        for id in [ArcId(0), ArcId(2), ArcId(3), ArcId(4)] {
            values[tm.x(id).0] = 1.0;
        }
        for v in 0..5 {
            values[tm.y(Node(v)).0] = 1.0;
        }
        values
    }

    fn set(tm: &TreeModel, values: &mut [f64], name: &str, value: f64) {
        let var = tm.model.var_by_name(name).unwrap();
        values[var.0] = value;
    }

    #[test]
    fn test_mtz_rejects_triangle() {
        let g = triangle_graph();
        let tm = build(&g, Formulation::Mtz, 4).unwrap();
        let mut values = root_arc_plus_triangle(&tm);
        // ranks along 1 -> 2 -> 3 -> 4; closing 4 -> 2 is the only thing left to fail
        for v in 1..5 {
            set(&tm, &mut values, &format!("u_{}", v), v as f64);
        }
        assert_eq!(
            tm.model.violations(&Assignment::new(values), 1e-9),
            vec!["rank_4_2"]
        );
    }

    #[test]
    fn test_scf_rejects_triangle() {
        let g = triangle_graph();
        let tm = build(&g, Formulation::Scf, 4).unwrap();
        let mut values = root_arc_plus_triangle(&tm);
        // the root ships k units to node 1, which cannot pass them on
        set(&tm, &mut values, "f_{0,1}", 4.0);
        let broken = tm.model.violations(&Assignment::new(values.clone()), 1e-9);
        assert_eq!(broken, vec!["flow_1", "flow_2", "flow_3", "flow_4"]);

        // circulating flow around the triangle cannot create supply either
        for name in ["f_{2,3}", "f_{3,4}", "f_{4,2}"] {
            set(&tm, &mut values, name, 3.0);
        }
        let broken = tm.model.violations(&Assignment::new(values), 1e-9);
        assert!(!broken.is_empty());
        assert!(broken.iter().all(|name| name.starts_with("flow_")), "{:?}", broken);
    }

    #[test]
    fn test_mcf_rejects_triangle() {
        let g = triangle_graph();
        let tm = build(&g, Formulation::Mcf, 4).unwrap();
        let mut values = root_arc_plus_triangle(&tm);
        // commodity 1 reaches its node; 2, 3 and 4 have no selected path from the root
        set(&tm, &mut values, "f_{0,1,1}", 1.0);
        let broken = tm.model.violations(&Assignment::new(values), 1e-9);
        assert_eq!(
            broken,
            vec!["flow_2_0", "flow_2_2", "flow_3_0", "flow_3_3", "flow_4_0", "flow_4_4"]
        );
    }

    #[test]
    fn test_triangle_only_breaks_cycle_rows() {
        // without the cycle rows the triangle would be a valid point
        let g = triangle_graph();
        for f in Formulation::ALL {
            let tm = build(&g, f, 4).unwrap();
            let values = root_arc_plus_triangle(&tm);
            let broken = tm.model.violations(&Assignment::new(values), 1e-9);
            assert!(
                broken.iter().all(|name| !name.starts_with("link_")
                    && !name.starts_with("in_degree_")
                    && name != "span"
                    && name != "select"
                    && name != "root_out"),
                "{} {:?}",
                f,
                broken
            );
        }
    }

    #[test]
    fn test_parallel_arcs_get_distinct_rows() {
        let g = Graph::new(
            3,
            vec![Arc::new(0, 1, 1), Arc::new(1, 2, 1), Arc::new(1, 2, 4)],
        )
        .unwrap();
        for f in Formulation::ALL {
            let tm = build(&g, f, 2).unwrap();
            assert!(tm.model.constraints().iter().map(|c| &c.name).all_unique());
            assert!(tm.model.constraint("link_1_2").is_some());

            let mut buf = vec![];
            tm.model.write_lp(&mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert_eq!(text.matches(" link_1_2").count(), 2);
        }
        let mtz = build(&g, Formulation::Mtz, 2).unwrap();
        let ranks = mtz
            .model
            .constraints()
            .iter()
            .filter(|c| c.name.starts_with("rank_2_1"))
            .count();
        assert_eq!(ranks, 2);
    }

    #[test]
    fn test_formulation_names() {
        for f in Formulation::ALL {
            assert_eq!(f.to_string().parse::<Formulation>().unwrap(), f);
        }
        assert_eq!("mcf".parse::<Formulation>().unwrap(), Formulation::Mcf);
        assert!("tsp".parse::<Formulation>().is_err());
    }
}
