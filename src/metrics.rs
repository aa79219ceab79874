use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, register_histogram, register_int_counter_vec, register_int_gauge_vec,
    Histogram, IntCounterVec, IntGaugeVec,
};

use crate::formulation::Formulation;
use crate::model::Model;
use crate::oracle::Outcome;

// Registered once in the default registry; scrape with `prometheus::gather()`
lazy_static! {
    pub static ref MODELS_BUILT: IntCounterVec = register_int_counter_vec!(
        "ktree_models_built_total",
        "Models built, by formulation",
        &["formulation"]
    )
    .expect("metric can be registered");
    pub static ref MODEL_VARIABLES: IntGaugeVec = register_int_gauge_vec!(
        "ktree_model_variables",
        "Variables in the last model built, by formulation",
        &["formulation"]
    )
    .expect("metric can be registered");
    pub static ref MODEL_CONSTRAINTS: IntGaugeVec = register_int_gauge_vec!(
        "ktree_model_constraints",
        "Constraints in the last model built, by formulation",
        &["formulation"]
    )
    .expect("metric can be registered");
    pub static ref SOLVES: IntCounterVec = register_int_counter_vec!(
        "ktree_solves_total",
        "Finished solves, by status",
        &["status"]
    )
    .expect("metric can be registered");
    pub static ref SEARCH_NODES: Histogram = register_histogram!(
        "ktree_search_nodes",
        "Branch-and-bound nodes explored per solve",
        exponential_buckets(1.0, 4.0, 10).expect("buckets are valid")
    )
    .expect("metric can be registered");
}

pub(crate) fn record_build(formulation: Formulation, model: &Model) {
    let label = [formulation.name()];
    MODELS_BUILT.with_label_values(&label).inc();
    MODEL_VARIABLES
        .with_label_values(&label)
        .set(model.num_vars() as i64);
    MODEL_CONSTRAINTS
        .with_label_values(&label)
        .set(model.num_constraints() as i64);
}

pub(crate) fn record_solve(outcome: &Outcome) {
    SOLVES.with_label_values(&[outcome.status.name()]).inc();
    SEARCH_NODES.observe(outcome.node_count as f64);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::formulation::{self, Formulation};
    use crate::instance::{Arc, Graph};

    #[test]
    fn test_builds_are_counted() {
        let g = Graph::new(3, vec![Arc::new(0, 1, 1), Arc::new(1, 2, 1)]).unwrap();
        let before = MODELS_BUILT.with_label_values(&["SCF"]).get();
        let tm = formulation::build(&g, Formulation::Scf, 2).unwrap();
        assert!(MODELS_BUILT.with_label_values(&["SCF"]).get() > before);
        assert_eq!(
            MODEL_VARIABLES.with_label_values(&["SCF"]).get() > 0,
            tm.model.num_vars() > 0
        );
    }
}
