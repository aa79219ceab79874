use fnv::FnvHashMap;

use crate::model::{Var, VarDef, VarKind};

#[derive(Clone, Debug)]
pub(crate) struct VariableRegister {
    variables: Vec<VarDef>,
    names: FnvHashMap<String, Var>,
}

impl VariableRegister {
    pub(crate) fn new() -> VariableRegister {
        VariableRegister {
            variables: vec![],
            names: FnvHashMap::default(),
        }
    }

    pub(crate) fn get(&self, var: Var) -> &VarDef {
        &self.variables[var.0]
    }

    pub(crate) fn get_by_name(&self, name: &str) -> Option<Var> {
        self.names.get(name).copied()
    }

    /// Registers a new variable. Names identify variables in exported models, so a repeated name
    /// gets the variable index appended.
    pub(crate) fn create(&mut self, name: &str, kind: VarKind, lower: f64, upper: f64) -> Var {
        let var = Var(self.variables.len());
        let name = if self.names.contains_key(name) {
            format!("{}#{}", name, var.0)
        } else {
            name.to_string()
        };
        self.names.insert(name.clone(), var);
        self.variables.push(VarDef {
            var,
            name,
            kind,
            lower,
            upper,
        });
        var
    }

    pub(crate) fn len(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &VarDef> + '_ {
        self.variables.iter()
    }
}
