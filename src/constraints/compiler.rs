//! Row declaration and bound compilation for base constraints.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::bound::{compile_bound, Bound};
use crate::document::DocumentExt;
use crate::error::{CompileError, Result};
use crate::problem::ProblemHandle;
use crate::symbols::SymbolTable;

/// Pick the single operation key of a constraint body.
///
/// Keys listed in `reserved` are not operations. Zero or several remaining
/// keys is a schema error carrying `message`.
pub(crate) fn single_operation<'a>(
    owner: &str,
    body: &'a Map<String, Value>,
    reserved: &[&str],
    message: &str,
) -> Result<(&'a str, &'a Value)> {
    let mut ops = body
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()));
    match (ops.next(), ops.next()) {
        (Some((key, operand)), None) => Ok((key.as_str(), operand)),
        _ => Err(CompileError::schema(format!(
            "{} (constraint '{}')",
            message, owner
        ))),
    }
}

/// Compile one constraint body into its bound.
pub fn constraint_bound(name: &str, spec: &Value) -> Result<Bound> {
    let body = spec.expect_object(&format!("constraint '{}'", name))?;
    let (keyword, operand) = single_operation(
        name,
        body,
        &[],
        "Constraints may contain only a single operation",
    )?;
    compile_bound(name, keyword, operand)
}

/// Declare every constraint as a row and set its name and bound.
///
/// Rows are appended after any rows already on the problem, in document
/// order.
pub fn compile_constraints<P: ProblemHandle + ?Sized>(
    problem: &mut P,
    constraints: &Map<String, Value>,
    symbols: &mut SymbolTable,
) -> Result<()> {
    if constraints.is_empty() {
        debug!("no constraints declared");
        return Ok(());
    }

    let first = problem.add_rows(constraints.len());
    debug!(count = constraints.len(), first_row = first, "compiling constraints");

    for (name, spec) in constraints {
        let row = symbols.declare_constraint(name)?;
        debug_assert!(row >= first);
        problem.set_row_name(row, name);

        let bound = constraint_bound(name, spec)?;
        trace!(row, constraint = %name, ?bound, "row bound");
        problem.set_row_bounds(row, bound);
    }

    Ok(())
}
