use std::time::{Duration, Instant};

use log::{debug, info};

use super::simplex::{LpSolution, Relaxation};
use super::{variable_bounds, Oracle, OracleSettings, Outcome, Result, SolveStatus};
use crate::metrics;
use crate::model::{Assignment, Model};

/// Depth-first branch-and-bound over the simplex relaxation, branching on the most fractional
/// integer variable.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    settings: OracleSettings,
}

#[derive(Clone)]
struct SearchNode {
    bounds: Vec<(f64, f64)>,
    // Objective of the parent relaxation
    lower_bound: f64,
}

struct Incumbent {
    objective: f64,
    x: Vec<f64>,
}

impl BranchAndBound {
    pub fn new(settings: OracleSettings) -> BranchAndBound {
        BranchAndBound { settings }
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    fn most_fractional(&self, integers: &[usize], x: &[f64]) -> Option<usize> {
        let mut branch_var = None;
        let mut max_fractionality = self.settings.int_tol;
        for &i in integers {
            let frac = x[i] - x[i].floor();
            let fractionality = frac.min(1.0 - frac);
            if fractionality > max_fractionality {
                max_fractionality = fractionality;
                branch_var = Some(i);
            }
        }
        branch_var
    }
}

impl Oracle for BranchAndBound {
    fn solve(&self, model: &Model, time_limit: Duration) -> Result<Outcome> {
        let start = Instant::now();
        let deadline = start.checked_add(time_limit);
        let settings = &self.settings;

        let base_bounds = variable_bounds(model)?;
        let integers: Vec<usize> = model
            .variables()
            .filter(|def| def.is_integer())
            .map(|def| def.var.0)
            .collect();
        let relaxation = Relaxation::new(model);

        let mut stack = vec![SearchNode {
            bounds: base_bounds,
            lower_bound: f64::NEG_INFINITY,
        }];
        let mut incumbent: Option<Incumbent> = None;
        let mut node_count = 0;
        let mut hit_limit = false;

        while let Some(node) = stack.pop() {
            let out_of_time = deadline.map_or(false, |d| Instant::now() >= d);
            if out_of_time || node_count >= settings.max_nodes {
                stack.push(node);
                hit_limit = true;
                break;
            }
            node_count += 1;

            let cutoff = incumbent
                .as_ref()
                .map_or(f64::INFINITY, |inc| inc.objective - settings.gap_tol);
            if node.lower_bound >= cutoff {
                continue;
            }

            let (x, objective) = match relaxation.solve(&node.bounds, settings)? {
                LpSolution::Infeasible => continue,
                LpSolution::Optimal { x, objective } => (x, objective),
            };
            if objective >= cutoff {
                debug!("node {}: pruned at bound {}", node_count, objective);
                continue;
            }

            let var = match self.most_fractional(&integers, &x) {
                Some(var) => var,
                None => {
                    let mut x = x;
                    for &i in &integers {
                        x[i] = x[i].round();
                    }
                    let objective = model.objective().evaluate(&x);
                    debug!("node {}: new incumbent {}", node_count, objective);
                    incumbent = Some(Incumbent { objective, x });
                    continue;
                }
            };

            // Push the down branch first so the up branch is explored first
            let value = x[var];
            let mut down = node.bounds.clone();
            down[var].1 = down[var].1.min(value.floor());
            if down[var].0 <= down[var].1 {
                stack.push(SearchNode {
                    bounds: down,
                    lower_bound: objective,
                });
            }
            let mut up = node.bounds;
            up[var].0 = up[var].0.max(value.ceil());
            if up[var].0 <= up[var].1 {
                stack.push(SearchNode {
                    bounds: up,
                    lower_bound: objective,
                });
            }
        }

        let status = match (hit_limit, incumbent.is_some()) {
            (false, true) => SolveStatus::Optimal,
            (false, false) => SolveStatus::Infeasible,
            (true, true) => SolveStatus::Feasible,
            (true, false) => SolveStatus::Timeout,
        };

        let relative_gap = incumbent.as_ref().and_then(|inc| {
            let bound = stack
                .iter()
                .map(|n| n.lower_bound)
                .fold(inc.objective, f64::min);
            if !bound.is_finite() {
                return None;
            }
            Some((inc.objective - bound).max(0.0) / inc.objective.abs().max(1e-10))
        });

        let outcome = Outcome {
            status,
            objective_value: incumbent.as_ref().map(|inc| inc.objective),
            node_count,
            relative_gap,
            assignment: incumbent.map(|inc| Assignment::new(inc.x)),
            elapsed: start.elapsed(),
        };
        info!(
            "solve finished: status={} obj={:?} nodes={} gap={:?} in {:?}",
            outcome.status,
            outcome.objective_value,
            outcome.node_count,
            outcome.relative_gap,
            outcome.elapsed
        );
        metrics::record_solve(&outcome);
        Ok(outcome)
    }
}
