//! Variable compilation.
//!
//! Each variable becomes a column with a kind, an objective coefficient read
//! from `values[objective]`, and one matrix entry per `values` key that names
//! a declared constraint.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::document::DocumentExt;
use crate::error::{CompileError, Result};
use crate::problem::ProblemHandle;
use crate::sparse::MatrixBuilder;
use crate::symbols::SymbolTable;

/// Column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Continuous,
    Integer,
    /// Integer restricted to {0, 1}.
    Binary,
}

impl VariableKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "continuous" => Some(VariableKind::Continuous),
            "integer" => Some(VariableKind::Integer),
            "binary" => Some(VariableKind::Binary),
            _ => None,
        }
    }

    /// Integer and binary columns.
    pub fn is_integral(&self) -> bool {
        !matches!(self, VariableKind::Continuous)
    }
}

/// Read and validate a variable's `kind`.
fn variable_kind(name: &str, spec: &Value) -> Result<VariableKind> {
    let context = format!("variable '{}'", name);
    let keyword = spec.field("kind", &context)?.expect_str(&context)?;
    VariableKind::from_keyword(keyword).ok_or_else(|| {
        CompileError::schema(format!(
            "variable '{}' has unknown kind '{}' (expected continuous, integer or binary)",
            name, keyword
        ))
    })
}

/// Declare every variable as a column and emit its coefficients.
///
/// `values` keys that name no declared constraint are skipped, unless
/// `strict_values` is set, in which case any key other than the objective
/// key must name a constraint.
pub fn compile_variables<P: ProblemHandle + ?Sized>(
    problem: &mut P,
    variables: &Map<String, Value>,
    objective_key: &str,
    symbols: &mut SymbolTable,
    builder: &mut MatrixBuilder,
    strict_values: bool,
) -> Result<()> {
    if variables.is_empty() {
        debug!("no variables declared");
        return Ok(());
    }

    let first = problem.add_cols(variables.len());
    let before = builder.len();

    for (name, spec) in variables {
        let col = symbols.declare_variable(name)?;
        debug_assert!(col >= first);
        problem.set_col_name(col, name);

        let kind = variable_kind(name, spec)?;
        problem.set_col_kind(col, kind);

        let context = format!("values of variable '{}'", name);
        let values = spec
            .field("values", &format!("variable '{}'", name))?
            .expect_object(&context)?;

        let objective = values
            .get(objective_key)
            .ok_or_else(|| {
                CompileError::schema(format!(
                    "variable '{}' has no value for objective '{}'",
                    name, objective_key
                ))
            })?
            .expect_number(&context)?;
        problem.set_obj_coef(col, objective);
        trace!(col, variable = %name, ?kind, objective, "column");

        for (key, value) in values {
            // The objective key never produces a matrix entry, even if a
            // constraint shares its name.
            if key == objective_key {
                continue;
            }
            match symbols.resolve_constraint(key) {
                Some(row) => {
                    let coef = value.expect_number(&format!("{} at '{}'", context, key))?;
                    builder.push(row, col, coef);
                }
                None if strict_values => {
                    return Err(CompileError::UnknownReference {
                        name: name.clone(),
                        reference: key.clone(),
                    });
                }
                None => {}
            }
        }
    }

    debug!(
        count = variables.len(),
        first_col = first,
        entries = builder.len() - before,
        "compiled variables"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;
    use serde_json::json;

    struct Fixture {
        problem: LpProblem,
        symbols: SymbolTable,
        builder: MatrixBuilder,
    }

    fn fixture(constraints: &[&str]) -> Fixture {
        let mut problem = LpProblem::new();
        let mut symbols = SymbolTable::new();
        problem.add_rows(constraints.len());
        for name in constraints {
            let row = symbols.declare_constraint(name).unwrap();
            problem.set_row_name(row, name);
        }
        Fixture {
            problem,
            symbols,
            builder: MatrixBuilder::new(),
        }
    }

    fn run(f: &mut Fixture, doc: Value, strict: bool) -> Result<()> {
        compile_variables(
            &mut f.problem,
            doc.as_object().unwrap(),
            "cost",
            &mut f.symbols,
            &mut f.builder,
            strict,
        )
    }

    #[test]
    fn test_columns_and_entries() {
        let mut f = fixture(&["c1", "c2"]);
        run(
            &mut f,
            json!({
                "x": {"kind": "continuous", "values": {"cost": 2, "c1": 1, "c2": 3}},
                "y": {"kind": "integer", "values": {"c2": 4, "cost": 0}},
            }),
            false,
        )
        .unwrap();

        assert_eq!(f.problem.num_cols(), 2);
        assert_eq!(f.problem.find_col("y"), Some(2));
        assert_eq!(f.problem.col(1).unwrap().objective, 2.0);
        assert_eq!(f.problem.col(2).unwrap().objective, 0.0);
        assert_eq!(f.problem.col(2).unwrap().kind, VariableKind::Integer);
        assert_eq!(f.builder.len(), 3);
        assert_eq!(f.builder.row_entries(2), vec![(1, 3.0), (2, 4.0)]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut f = fixture(&["c1"]);
        run(
            &mut f,
            json!({"x": {"kind": "binary", "values": {"cost": 1, "c1": 2, "note": "free text"}}}),
            false,
        )
        .unwrap();
        assert_eq!(f.builder.len(), 1);
    }

    #[test]
    fn test_unknown_keys_strict() {
        let mut f = fixture(&["c1"]);
        let result = run(
            &mut f,
            json!({"x": {"kind": "binary", "values": {"cost": 1, "weight": 2}}}),
            true,
        );
        assert_eq!(
            result,
            Err(CompileError::UnknownReference {
                name: "x".into(),
                reference: "weight".into()
            })
        );
    }

    #[test]
    fn test_zero_coefficient_dropped() {
        let mut f = fixture(&["c1", "c2"]);
        run(
            &mut f,
            json!({"x": {"kind": "continuous", "values": {"cost": 1, "c1": 0, "c2": 0.0}}}),
            false,
        )
        .unwrap();
        assert!(f.builder.is_empty());
    }

    #[test]
    fn test_objective_key_not_a_matrix_entry() {
        let mut f = fixture(&["cost", "c1"]);
        run(
            &mut f,
            json!({"x": {"kind": "continuous", "values": {"cost": 5, "c1": 2}}}),
            true,
        )
        .unwrap();
        assert_eq!(f.problem.col(1).unwrap().objective, 5.0);
        assert!(f.builder.row_entries(1).is_empty());
        assert_eq!(f.builder.row_entries(2), vec![(1, 2.0)]);
    }

    #[test]
    fn test_kind_errors() {
        let mut f = fixture(&[]);
        let missing = run(&mut f, json!({"x": {"values": {"cost": 1}}}), false);
        assert!(matches!(missing, Err(CompileError::Schema(_))));

        let mut f = fixture(&[]);
        let unknown = run(
            &mut f,
            json!({"x": {"kind": "semicontinuous", "values": {"cost": 1}}}),
            false,
        );
        match unknown {
            Err(CompileError::Schema(msg)) => assert!(msg.contains("semicontinuous")),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_objective_required_and_numeric() {
        let mut f = fixture(&[]);
        let missing = run(&mut f, json!({"x": {"kind": "integer", "values": {}}}), false);
        assert!(matches!(missing, Err(CompileError::Schema(_))));

        let mut f = fixture(&[]);
        let wrong = run(
            &mut f,
            json!({"x": {"kind": "integer", "values": {"cost": "2"}}}),
            false,
        );
        assert!(matches!(wrong, Err(CompileError::Schema(_))));
    }

    #[test]
    fn test_non_numeric_coefficient() {
        let mut f = fixture(&["c1"]);
        let result = run(
            &mut f,
            json!({"x": {"kind": "continuous", "values": {"cost": 1, "c1": [1]}}}),
            false,
        );
        assert!(matches!(result, Err(CompileError::Schema(_))));
    }

    #[test]
    fn test_kind_keywords() {
        assert_eq!(VariableKind::from_keyword("binary"), Some(VariableKind::Binary));
        assert_eq!(VariableKind::from_keyword("real"), None);
        assert!(VariableKind::Integer.is_integral());
        assert!(!VariableKind::Continuous.is_integral());
    }
}
