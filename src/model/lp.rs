use std::io::{self, Write};

use super::{LinExpr, Model, VarKind};

// CPLEX readers cap line length, so long expressions are wrapped
const TERMS_PER_LINE: usize = 8;

pub(super) fn write<W: Write>(model: &Model, out: &mut W) -> io::Result<()> {
    writeln!(out, "Minimize")?;
    write!(out, " obj:")?;
    write_expr(model, &model.objective, out)?;
    if model.objective.constant_term() != 0.0 {
        write!(out, " {}", signed(model.objective.constant_term()))?;
    }
    writeln!(out)?;

    writeln!(out, "Subject To")?;
    for constraint in model.constraints.iter() {
        write!(out, " {}:", constraint.name)?;
        write_expr(model, &constraint.lhs, out)?;
        writeln!(out, " {} {}", constraint.sense, constraint.rhs)?;
    }

    writeln!(out, "Bounds")?;
    for def in model.variables.iter() {
        if def.kind == VarKind::Binary {
            continue;
        }
        if def.lower == def.upper {
            writeln!(out, " {} = {}", def.name, def.lower)?;
        } else if def.upper.is_finite() {
            writeln!(out, " {} <= {} <= {}", def.lower, def.name, def.upper)?;
        } else {
            writeln!(out, " {} >= {}", def.name, def.lower)?;
        }
    }

    let binaries: Vec<&str> = model
        .variables
        .iter()
        .filter(|def| def.kind == VarKind::Binary)
        .map(|def| def.name.as_str())
        .collect();
    if !binaries.is_empty() {
        writeln!(out, "Binaries")?;
        for chunk in binaries.chunks(TERMS_PER_LINE) {
            writeln!(out, " {}", chunk.join(" "))?;
        }
    }
    writeln!(out, "End")
}

fn write_expr<W: Write>(model: &Model, expr: &LinExpr, out: &mut W) -> io::Result<()> {
    if expr.is_empty() {
        // An empty row still needs a variable to be valid LP syntax
        if let Some(def) = model.variables.iter().next() {
            write!(out, " 0 {}", def.name)?;
        }
        return Ok(());
    }
    for (ix, &(var, coef)) in expr.terms().iter().enumerate() {
        if ix > 0 && ix % TERMS_PER_LINE == 0 {
            write!(out, "\n   ")?;
        }
        write!(out, " {} {}", signed(coef), model.variables.get(var).name)?;
    }
    Ok(())
}

fn signed(value: f64) -> String {
    if value < 0.0 {
        format!("- {}", -value)
    } else {
        format!("+ {}", value)
    }
}
