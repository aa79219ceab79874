use log::trace;

use super::{OracleError, OracleSettings, Result};
use crate::model::{Model, Sense};

// Degenerate pivots in a row before switching from Dantzig's rule to Bland's, which cannot cycle
const DEGENERATE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpSolution {
    Optimal { x: Vec<f64>, objective: f64 },
    Infeasible,
}

/// The continuous relaxation of a model, with dense constraint rows.
#[derive(Debug, Clone)]
pub(crate) struct Relaxation {
    costs: Vec<f64>,
    rows: Vec<Vec<f64>>,
    senses: Vec<Sense>,
    rhs: Vec<f64>,
}

impl Relaxation {
    pub(crate) fn new(model: &Model) -> Relaxation {
        let n = model.num_vars();
        let mut costs = vec![0.0; n];
        for &(var, coef) in model.objective().terms() {
            costs[var.0] += coef;
        }

        let mut rows = Vec::with_capacity(model.num_constraints());
        let mut senses = Vec::with_capacity(model.num_constraints());
        let mut rhs = Vec::with_capacity(model.num_constraints());
        for constraint in model.constraints() {
            let mut row = vec![0.0; n];
            for &(var, coef) in constraint.lhs.terms() {
                row[var.0] += coef;
            }
            rows.push(row);
            senses.push(constraint.sense);
            rhs.push(constraint.rhs - constraint.lhs.constant_term());
        }

        Relaxation {
            costs,
            rows,
            senses,
            rhs,
        }
    }

    /// Minimizes the relaxation with every variable held in `bounds`. Lower bounds must be finite.
    pub(crate) fn solve(
        &self,
        bounds: &[(f64, f64)],
        settings: &OracleSettings,
    ) -> Result<LpSolution> {
        let n = self.costs.len();
        if bounds
            .iter()
            .any(|&(lower, upper)| lower > upper + settings.feas_tol)
        {
            return Ok(LpSolution::Infeasible);
        }

        // Substitute x = lower + x' so that every column is non-negative
        let mut rows = Vec::with_capacity(self.rows.len() + n);
        for ((row, &sense), &rhs) in self.rows.iter().zip(&self.senses).zip(&self.rhs) {
            let shift: f64 = row
                .iter()
                .zip(bounds)
                .map(|(coef, &(lower, _))| coef * lower)
                .sum();
            rows.push((row.clone(), sense, rhs - shift));
        }
        for (j, &(lower, upper)) in bounds.iter().enumerate() {
            if upper.is_finite() {
                let mut row = vec![0.0; n];
                row[j] = 1.0;
                rows.push((row, Sense::Le, (upper - lower).max(0.0)));
            }
        }

        let mut tableau = Tableau::new(n, rows, settings);
        if !tableau.phase_one()? {
            return Ok(LpSolution::Infeasible);
        }
        tableau.phase_two(&self.costs)?;
        trace!("relaxation solved in {} pivots", tableau.iterations);

        let x: Vec<f64> = tableau
            .primal()
            .into_iter()
            .zip(bounds)
            .map(|(shifted, &(lower, upper))| (lower + shifted).max(lower).min(upper))
            .collect();
        let objective: f64 = x.iter().zip(&self.costs).map(|(xi, ci)| xi * ci).sum();
        Ok(LpSolution::Optimal { x, objective })
    }
}

/// Dense simplex tableau. Columns are laid out as structurals, then slacks, then artificials;
/// the last entry of each row is its right-hand side.
struct Tableau<'s> {
    structurals: usize,
    first_artificial: usize,
    width: usize,
    rows: Vec<Vec<f64>>,
    // Reduced costs, with minus the objective value in the last entry
    objective: Vec<f64>,
    basis: Vec<usize>,
    settings: &'s OracleSettings,
    iterations: usize,
}

impl<'s> Tableau<'s> {
    fn new(
        structurals: usize,
        rows: Vec<(Vec<f64>, Sense, f64)>,
        settings: &'s OracleSettings,
    ) -> Tableau<'s> {
        // Right-hand sides must be non-negative for the slack/artificial basis to be feasible
        let rows: Vec<(Vec<f64>, Sense, f64)> = rows
            .into_iter()
            .map(|(coefs, sense, rhs)| {
                if rhs >= 0.0 {
                    return (coefs, sense, rhs);
                }
                let flipped = match sense {
                    Sense::Le => Sense::Ge,
                    Sense::Ge => Sense::Le,
                    Sense::Eq => Sense::Eq,
                };
                (coefs.into_iter().map(|c| -c).collect(), flipped, -rhs)
            })
            .collect();

        let slack_count = rows.iter().filter(|r| r.1 != Sense::Eq).count();
        let artificial_count = rows.iter().filter(|r| r.1 != Sense::Le).count();
        let first_artificial = structurals + slack_count;
        let width = first_artificial + artificial_count;

        let mut slack = structurals;
        let mut artificial = first_artificial;
        let mut dense = Vec::with_capacity(rows.len());
        let mut basis = Vec::with_capacity(rows.len());
        for (coefs, sense, rhs) in rows {
            let mut row = vec![0.0; width + 1];
            row[..structurals].copy_from_slice(&coefs);
            row[width] = rhs;
            match sense {
                Sense::Le => {
                    row[slack] = 1.0;
                    basis.push(slack);
                    slack += 1;
                }
                Sense::Ge => {
                    row[slack] = -1.0;
                    slack += 1;
                    row[artificial] = 1.0;
                    basis.push(artificial);
                    artificial += 1;
                }
                Sense::Eq => {
                    row[artificial] = 1.0;
                    basis.push(artificial);
                    artificial += 1;
                }
            }
            dense.push(row);
        }

        Tableau {
            structurals,
            first_artificial,
            width,
            rows: dense,
            objective: vec![0.0; width + 1],
            basis,
            settings,
            iterations: 0,
        }
    }

    /// Minimizes the sum of artificials. Returns whether the rows are feasible.
    fn phase_one(&mut self) -> Result<bool> {
        if self.first_artificial == self.width {
            return Ok(true);
        }

        let width = self.width;
        self.objective = vec![0.0; width + 1];
        for j in self.first_artificial..width {
            self.objective[j] = 1.0;
        }
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic >= self.first_artificial {
                for (d, a) in self.objective.iter_mut().zip(row) {
                    *d -= a;
                }
            }
        }

        self.iterate(width)?;
        let infeasibility = -self.objective[width];
        if infeasibility > self.settings.feas_tol {
            trace!("phase one stuck at infeasibility {}", infeasibility);
            return Ok(false);
        }

        // Artificials still basic sit at zero. Swap them for any structural or slack column; a row
        // without one is redundant and keeps its artificial, which never moves again.
        for r in 0..self.rows.len() {
            if self.basis[r] < self.first_artificial {
                continue;
            }
            let replacement =
                (0..self.first_artificial).find(|&j| self.rows[r][j].abs() > self.settings.pivot_tol);
            if let Some(s) = replacement {
                self.pivot(r, s);
            }
        }
        Ok(true)
    }

    fn phase_two(&mut self, costs: &[f64]) -> Result<()> {
        let width = self.width;
        self.objective = vec![0.0; width + 1];
        self.objective[..self.structurals].copy_from_slice(costs);
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let cost = if basic < self.structurals {
                costs[basic]
            } else {
                0.0
            };
            if cost != 0.0 {
                for (d, a) in self.objective.iter_mut().zip(row) {
                    *d -= cost * a;
                }
            }
        }
        self.iterate(self.first_artificial)
    }

    /// Pivots until no column below `entering_limit` has a negative reduced cost.
    fn iterate(&mut self, entering_limit: usize) -> Result<()> {
        let tol = self.settings.pivot_tol;
        let width = self.width;
        let mut degenerate_run = 0;
        let mut bland = false;

        loop {
            if self.iterations >= self.settings.max_iter {
                return Err(OracleError::IterationLimit(self.settings.max_iter));
            }

            let mut candidates = (0..entering_limit).filter(|&j| self.objective[j] < -tol);
            let entering = if bland {
                candidates.next()
            } else {
                candidates.min_by(|&a, &b| self.objective[a].total_cmp(&self.objective[b]))
            };
            let s = match entering {
                Some(s) => s,
                None => return Ok(()),
            };

            // Minimum ratio, ties to the smallest basic column
            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                if row[s] <= tol {
                    continue;
                }
                let ratio = row[width].max(0.0) / row[s];
                leaving = match leaving {
                    Some((r, best))
                        if ratio > best + tol
                            || (ratio >= best - tol && self.basis[r] < self.basis[i]) =>
                    {
                        Some((r, best))
                    }
                    _ => Some((i, ratio)),
                };
            }
            let (r, ratio) = match leaving {
                Some(leaving) => leaving,
                None => return Err(OracleError::Unbounded),
            };

            if ratio <= tol {
                degenerate_run += 1;
                if degenerate_run > DEGENERATE_LIMIT && !bland {
                    trace!("switching to Bland's rule after {} degenerate pivots", degenerate_run);
                    bland = true;
                }
            } else {
                degenerate_run = 0;
            }

            self.pivot(r, s);
            self.iterations += 1;
        }
    }

    fn pivot(&mut self, r: usize, s: usize) {
        let pivot = self.rows[r][s];
        for v in self.rows[r].iter_mut() {
            *v /= pivot;
        }
        let pivot_row = self.rows[r].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            eliminate(row, &pivot_row, s);
        }
        eliminate(&mut self.objective, &pivot_row, s);
        self.basis[r] = s;
    }

    /// Values of the structural columns at the current basis.
    fn primal(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.structurals];
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic < self.structurals {
                x[basic] = row[self.width];
            }
        }
        x
    }
}

fn eliminate(row: &mut [f64], pivot_row: &[f64], s: usize) {
    let factor = row[s];
    if factor == 0.0 {
        return;
    }
    for (v, p) in row.iter_mut().zip(pivot_row) {
        *v -= factor * p;
    }
    row[s] = 0.0;
}
