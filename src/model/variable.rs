use std::fmt;

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Var(pub usize);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    Binary,
    Continuous,
}

/// Declaration of a decision variable: its name, domain and bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDef {
    pub var: Var,
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

impl VarDef {
    pub fn is_integer(&self) -> bool {
        self.kind == VarKind::Binary
    }
}
