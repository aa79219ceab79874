/// Tolerances and limits of the reference oracle.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    /// Distance to the nearest integer below which a value counts as integral.
    pub int_tol: f64,
    /// Largest constraint violation a relaxation solution may carry.
    pub feas_tol: f64,
    /// Smallest magnitude accepted as a pivot element.
    pub pivot_tol: f64,
    /// Nodes whose bound is within this of the incumbent are pruned.
    pub gap_tol: f64,
    /// Branch-and-bound nodes explored before giving up.
    pub max_nodes: usize,
    /// Simplex pivots per relaxation before giving up.
    pub max_iter: usize,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            int_tol: 1e-6,
            feas_tol: 1e-7,
            pivot_tol: 1e-9,
            gap_tol: 1e-6,
            max_nodes: 1_000_000,
            max_iter: 100_000,
        }
    }
}
