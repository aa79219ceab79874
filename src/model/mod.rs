// The `model` module holds the mixed-integer linear model handed to an oracle. A `Model` is built
// once through `ModelBuilder` and read-only afterwards.
mod variable;
pub use crate::model::variable::{Var, VarDef, VarKind};

mod expr;
pub use crate::model::expr::LinExpr;

mod constraint;
pub use crate::model::constraint::{Constraint, Sense};

mod lp;

use std::io::{self, Write};

use crate::variable_registry::VariableRegister;

#[derive(Clone, Debug)]
pub struct Model {
    pub(crate) variables: VariableRegister,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: LinExpr,
}

impl Model {
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_integers(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn var(&self, var: Var) -> &VarDef {
        self.variables.get(var)
    }

    pub fn var_by_name(&self, name: &str) -> Option<Var> {
        self.variables.get_by_name(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VarDef> + '_ {
        self.variables.iter()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// The objective, always minimized.
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective.evaluate(assignment.values())
    }

    /// Names of the bounds, integrality requirements and constraints `assignment` breaks.
    pub fn violations(&self, assignment: &Assignment, tol: f64) -> Vec<String> {
        if assignment.len() != self.num_vars() {
            return vec![format!(
                "assignment has {} values, model has {} variables",
                assignment.len(),
                self.num_vars()
            )];
        }
        let values = assignment.values();
        let mut broken = vec![];
        for def in self.variables.iter() {
            let value = values[def.var.0];
            if value < def.lower - tol || value > def.upper + tol {
                broken.push(format!("bounds({})", def.name));
            }
            if def.is_integer() && (value - value.round()).abs() > tol {
                broken.push(format!("integrality({})", def.name));
            }
        }
        broken.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tol))
                .map(|c| c.name.clone()),
        );
        broken
    }

    pub fn is_feasible(&self, assignment: &Assignment, tol: f64) -> bool {
        self.violations(assignment, tol).is_empty()
    }

    /// Writes the model in CPLEX LP format.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> io::Result<()> {
        lp::write(self, out)
    }
}

/// Values for every variable of a model, indexed by `Var`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment(Vec<f64>);

impl Assignment {
    pub fn new(values: Vec<f64>) -> Assignment {
        Assignment(values)
    }

    pub fn value(&self, var: Var) -> f64 {
        self.0[var.0]
    }

    /// Binary variables count as set above one half.
    pub fn is_set(&self, var: Var) -> bool {
        self.0[var.0] > 0.5
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
