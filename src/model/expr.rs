use std::ops::{Add, Mul, Neg, Sub};

use itertools::Itertools;

use super::Var;

/// A linear expression `Σ coef·var + constant`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(Var, f64)>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> LinExpr {
        LinExpr::default()
    }

    pub fn constant(value: f64) -> LinExpr {
        LinExpr {
            terms: vec![],
            constant: value,
        }
    }

    pub fn sum<I: IntoIterator<Item = Var>>(vars: I) -> LinExpr {
        LinExpr::weighted_sum(vars.into_iter().map(|v| (v, 1.0)))
    }

    pub fn weighted_sum<I: IntoIterator<Item = (Var, f64)>>(terms: I) -> LinExpr {
        LinExpr {
            terms: terms.into_iter().collect(),
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: Var, coef: f64) {
        self.terms.push((var, coef));
    }

    pub fn terms(&self) -> &[(Var, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values[var.0])
            .sum::<f64>()
            + self.constant
    }

    /// Merges repeated variables and drops zero coefficients. Terms end up sorted by variable.
    pub fn compact(self) -> LinExpr {
        let terms = self
            .terms
            .into_iter()
            .sorted_by_key(|&(var, _)| var)
            .coalesce(|a, b| {
                if a.0 == b.0 {
                    Ok((a.0, a.1 + b.1))
                } else {
                    Err((a, b))
                }
            })
            .filter(|&(_, coef)| coef != 0.0)
            .collect();
        LinExpr {
            terms,
            constant: self.constant,
        }
    }

    fn scale(mut self, factor: f64) -> LinExpr {
        for term in self.terms.iter_mut() {
            term.1 *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl From<Var> for LinExpr {
    fn from(var: Var) -> LinExpr {
        LinExpr {
            terms: vec![(var, 1.0)],
            constant: 0.0,
        }
    }
}

impl From<f64> for LinExpr {
    fn from(value: f64) -> LinExpr {
        LinExpr::constant(value)
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self + rhs.into().scale(-1.0)
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scale(-1.0)
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        self.scale(rhs)
    }
}

impl<T: Into<LinExpr>> Add<T> for Var {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for Var {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Mul<f64> for Var {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr::weighted_sum([(self, rhs)])
    }
}

impl Mul<Var> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: Var) -> LinExpr {
        rhs * self
    }
}

impl Mul<LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs.scale(self)
    }
}

impl Sub<Var> for f64 {
    type Output = LinExpr;

    fn sub(self, rhs: Var) -> LinExpr {
        LinExpr::constant(self) - rhs
    }
}

impl Sub<LinExpr> for f64 {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        LinExpr::constant(self) - rhs
    }
}
