use fnv::FnvHashSet;

use crate::model::{Constraint, LinExpr, Model, Sense, Var, VarKind};
use crate::variable_registry::VariableRegister;

/// Collects variables, constraints and the objective of a `Model`.
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    variables: VariableRegister,
    constraints: Vec<Constraint>,
    constraint_names: FnvHashSet<String>,
    objective: LinExpr,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> ModelBuilder {
        ModelBuilder {
            variables: VariableRegister::new(),
            constraints: vec![],
            constraint_names: FnvHashSet::default(),
            objective: LinExpr::new(),
        }
    }

    pub fn binary(&mut self, name: &str) -> Var {
        self.variables.create(name, VarKind::Binary, 0.0, 1.0)
    }

    pub fn continuous(&mut self, name: &str, lower: f64, upper: f64) -> Var {
        self.variables.create(name, VarKind::Continuous, lower, upper)
    }

    /// Adds a constraint. Like variables, a repeated name gets the constraint index appended, so
    /// rows stay addressable and exported models stay valid.
    pub fn require(&mut self, mut constraint: Constraint) {
        if self.constraint_names.contains(&constraint.name) {
            constraint.name = format!("{}#{}", constraint.name, self.constraints.len());
        }
        self.constraint_names.insert(constraint.name.clone());
        self.constraints.push(constraint)
    }

    pub fn eq(&mut self, name: impl Into<String>, lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) {
        self.require(Constraint::new(name, lhs, Sense::Eq, rhs))
    }

    pub fn le(&mut self, name: impl Into<String>, lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) {
        self.require(Constraint::new(name, lhs, Sense::Le, rhs))
    }

    pub fn ge(&mut self, name: impl Into<String>, lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) {
        self.require(Constraint::new(name, lhs, Sense::Ge, rhs))
    }

    pub fn minimize(&mut self, objective: impl Into<LinExpr>) {
        self.objective = objective.into().compact();
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn build(self) -> Model {
        Model {
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective,
        }
    }
}
