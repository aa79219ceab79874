use std::fmt;

use super::LinExpr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "="),
        }
    }
}

/// A named linear constraint, kept as `lhs sense rhs` with every variable on the left.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub lhs: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(
        name: impl Into<String>,
        lhs: impl Into<LinExpr>,
        sense: Sense,
        rhs: impl Into<LinExpr>,
    ) -> Constraint {
        let moved = (lhs.into() - rhs.into()).compact();
        let rhs = -moved.constant_term();
        let lhs = moved - LinExpr::constant(-rhs);
        Constraint {
            name: name.into(),
            lhs: lhs.compact(),
            sense,
            rhs: if rhs == 0.0 { 0.0 } else { rhs },
        }
    }

    pub fn activity(&self, values: &[f64]) -> f64 {
        self.lhs.evaluate(values)
    }

    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let activity = self.activity(values);
        match self.sense {
            Sense::Le => activity <= self.rhs + tol,
            Sense::Ge => activity >= self.rhs - tol,
            Sense::Eq => (activity - self.rhs).abs() <= tol,
        }
    }
}
