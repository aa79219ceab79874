// The `oracle` module solves built models. `Oracle` is the seam for any MIP engine;
// `BranchAndBound` is the reference implementation used by the tests and the demo.
mod branch_and_bound;
pub use crate::oracle::branch_and_bound::BranchAndBound;

mod settings;
pub use crate::oracle::settings::OracleSettings;

mod simplex;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::model::{Assignment, Model};

use self::simplex::{LpSolution, Relaxation};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("simplex did not converge within {0} iterations")]
    IterationLimit(usize),
    #[error("the relaxation is unbounded")]
    Unbounded,
    #[error("variable {0} has no finite lower bound")]
    UnboundedBelow(String),
}

pub type Result<T> = std::result::Result<T, OracleError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Search finished with a proven optimum.
    Optimal,
    /// A limit stopped the search after an integral solution was found.
    Feasible,
    /// Search finished without any integral solution.
    Infeasible,
    /// A limit stopped the search before any integral solution was found.
    Timeout,
}

impl SolveStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Timeout => "timeout",
        }
    }

    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub node_count: usize,
    /// `(incumbent - bound) / |incumbent|`, when both are known.
    pub relative_gap: Option<f64>,
    pub assignment: Option<Assignment>,
    pub elapsed: Duration,
}

pub trait Oracle {
    /// Minimizes `model`, giving up after `time_limit`. Running out of time is not an error: the
    /// best solution found so far comes back with a `Feasible` status.
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<Outcome>;
}

/// Optimal value of the continuous relaxation of `model`, `None` when even that is infeasible.
pub fn relaxation_bound(model: &Model, settings: &OracleSettings) -> Result<Option<f64>> {
    let bounds = variable_bounds(model)?;
    match Relaxation::new(model).solve(&bounds, settings)? {
        LpSolution::Optimal { objective, .. } => Ok(Some(objective)),
        LpSolution::Infeasible => Ok(None),
    }
}

fn variable_bounds(model: &Model) -> Result<Vec<(f64, f64)>> {
    let mut bounds = Vec::with_capacity(model.num_vars());
    for def in model.variables() {
        if !def.lower.is_finite() {
            return Err(OracleError::UnboundedBelow(def.name.clone()));
        }
        bounds.push((def.lower, def.upper));
    }
    Ok(bounds)
}
