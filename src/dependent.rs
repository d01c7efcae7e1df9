//! Dependent constraints: rows derived from rows already compiled.
//!
//! A dependent constraint names existing rows in `terms`, each with a
//! `coefficient` and a `constant`, and carries one bound operation. Its
//! coefficients are built in a dense accumulator over the columns:
//!
//! ```text
//! acc[col] += coefficient * existing[row][col] + constant
//! ```
//!
//! for every nonzero `existing[row][col]`. The constant is therefore applied
//! once per nonzero cell of the referenced row, so a row with `k` nonzero
//! columns contributes `k * constant` in total.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::constraints::compile_bound;
use crate::constraints::compiler::single_operation;
use crate::document::DocumentExt;
use crate::error::{CompileError, Result};
use crate::problem::ProblemHandle;
use crate::sparse::MatrixBuilder;
use crate::symbols::SymbolTable;

/// Key holding the term mapping in a dependent constraint body.
pub const TERMS_KEY: &str = "terms";

/// One `(coefficient, constant)` pair applied to a referenced row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub coefficient: f64,
    pub constant: f64,
}

impl Term {
    pub fn new(coefficient: f64, constant: f64) -> Self {
        Term {
            coefficient,
            constant,
        }
    }

    fn from_document(owner: &str, reference: &str, value: &Value) -> Result<Self> {
        let context = format!("term '{}' of dependent constraint '{}'", reference, owner);
        Ok(Term {
            coefficient: value.field("coefficient", &context)?.expect_number(&context)?,
            constant: value.field("constant", &context)?.expect_number(&context)?,
        })
    }

    /// Contribution of one nonzero cell.
    pub fn apply(&self, value: f64) -> f64 {
        self.coefficient * value + self.constant
    }
}

/// Fold `terms` over their referenced rows into a dense accumulator indexed by
/// 1-based column. Index 0 is unused.
///
/// `row_of` resolves a name to a row; `entries_of` reads a row's stored
/// entries. Every stored entry counts as a nonzero cell.
pub fn accumulate<R, E>(
    owner: &str,
    terms: &[(String, Term)],
    num_cols: usize,
    row_of: R,
    entries_of: E,
) -> Result<Vec<f64>>
where
    R: Fn(&str) -> Option<usize>,
    E: Fn(usize) -> Vec<(usize, f64)>,
{
    let mut acc = vec![0.0; num_cols + 1];
    for (reference, term) in terms {
        let row = row_of(reference.as_str()).ok_or_else(|| CompileError::UnknownReference {
            name: owner.to_string(),
            reference: reference.clone(),
        })?;
        for (col, value) in entries_of(row) {
            if col >= acc.len() {
                acc.resize(col + 1, 0.0);
            }
            acc[col] += term.apply(value);
        }
    }
    Ok(acc)
}

/// Parse the `terms` mapping of a dependent constraint, in document order.
fn parse_terms(owner: &str, body: &Map<String, Value>) -> Result<Vec<(String, Term)>> {
    let context = format!("dependent constraint '{}'", owner);
    let terms = body
        .get(TERMS_KEY)
        .ok_or_else(|| {
            CompileError::schema(format!("{}: missing required field '{}'", context, TERMS_KEY))
        })?
        .expect_object(&format!("terms of {}", context))?;

    terms
        .iter()
        .map(|(reference, value)| -> Result<(String, Term)> {
            Ok((reference.clone(), Term::from_document(owner, reference, value)?))
        })
        .collect()
}

/// Derive every dependent constraint as a new row appended to the problem.
///
/// Rows are declared in `symbols` as they are derived, so a later dependent
/// constraint may reference an earlier one, but not itself or a later one.
/// Returns the number of rows added.
/// The caller commits `builder` to the problem afterwards.
pub fn compile_dependent_constraints<P: ProblemHandle + ?Sized>(
    problem: &mut P,
    dependents: &Map<String, Value>,
    symbols: &mut SymbolTable,
    builder: &mut MatrixBuilder,
) -> Result<usize> {
    for (name, spec) in dependents {
        let row = symbols.declare_constraint(name)?;
        let added = problem.add_rows(1);
        debug_assert_eq!(added, row);
        problem.set_row_name(row, name);

        let body = spec.expect_object(&format!("dependent constraint '{}'", name))?;
        let (keyword, operand) = single_operation(
            name,
            body,
            &[TERMS_KEY],
            "Dependent constraints may contain only a single operation besides 'terms'",
        )?;
        let bound = compile_bound(name, keyword, operand)?;
        problem.set_row_bounds(row, bound);

        let terms = parse_terms(name, body)?;
        let acc = accumulate(
            name,
            &terms,
            symbols.num_variables(),
            |reference| {
                if reference == name.as_str() {
                    None
                } else {
                    symbols.resolve_constraint(reference)
                }
            },
            |r| builder.row_entries(r),
        )?;

        let mut emitted = 0;
        for (col, &value) in acc.iter().enumerate().skip(1) {
            if builder.push(row, col, value) {
                emitted += 1;
            }
        }
        trace!(row, constraint = %name, terms = terms.len(), emitted, ?bound, "derived row");
    }

    debug!(count = dependents.len(), "compiled dependent constraints");
    Ok(dependents.len())
}
