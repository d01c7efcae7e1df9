//! Symbol table for constraint and variable names.
//!
//! Rows and columns are 1-based and assigned in declaration order.

use std::collections::HashMap;

use crate::error::{CompileError, Result};
use crate::problem::ProblemHandle;

/// One namespace of names mapped to 1-based indices.
#[derive(Debug, Clone, Default)]
struct Namespace {
    index_of: HashMap<String, usize>,
    names: Vec<Option<String>>,
}

impl Namespace {
    fn declare(&mut self, name: &str, what: &str) -> Result<usize> {
        if self.index_of.contains_key(name) {
            return Err(CompileError::schema(format!(
                "{} '{}' is declared more than once",
                what, name
            )));
        }
        self.names.push(Some(name.to_string()));
        let index = self.names.len();
        self.index_of.insert(name.to_string(), index);
        Ok(index)
    }

    fn reserve(&mut self) -> usize {
        self.names.push(None);
        self.names.len()
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    fn name(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .and_then(|name| name.as_deref())
    }
}

/// Bidirectional map between names and matrix indices.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    constraints: Namespace,
    variables: Namespace,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the rows and columns already present on a problem handle.
    ///
    /// Unnamed rows and columns keep their index but cannot be resolved.
    pub fn from_problem<P: ProblemHandle + ?Sized>(problem: &P) -> Result<Self> {
        let mut table = SymbolTable::new();
        for row in 1..=problem.num_rows() {
            match problem.row_name(row) {
                Some(name) => table.declare_constraint(name)?,
                None => table.constraints.reserve(),
            };
        }
        for col in 1..=problem.num_cols() {
            match problem.col_name(col) {
                Some(name) => table.declare_variable(name)?,
                None => table.variables.reserve(),
            };
        }
        Ok(table)
    }

    /// Assign the next row index to a constraint.
    pub fn declare_constraint(&mut self, name: &str) -> Result<usize> {
        self.constraints.declare(name, "Constraint")
    }

    /// Assign the next column index to a variable.
    pub fn declare_variable(&mut self, name: &str) -> Result<usize> {
        self.variables.declare(name, "Variable")
    }

    pub fn resolve_constraint(&self, name: &str) -> Option<usize> {
        self.constraints.resolve(name)
    }

    pub fn resolve_variable(&self, name: &str) -> Option<usize> {
        self.variables.resolve(name)
    }

    pub fn constraint_name(&self, row: usize) -> Option<&str> {
        self.constraints.name(row)
    }

    pub fn variable_name(&self, col: usize) -> Option<&str> {
        self.variables.name(col)
    }

    /// Number of declared rows.
    pub fn num_constraints(&self) -> usize {
        self.constraints.names.len()
    }

    /// Number of declared columns.
    pub fn num_variables(&self) -> usize {
        self.variables.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    #[test]
    fn test_declaration_order() {
        let mut table = SymbolTable::new();
        assert_eq!(table.declare_constraint("b").unwrap(), 1);
        assert_eq!(table.declare_constraint("a").unwrap(), 2);
        assert_eq!(table.declare_variable("x").unwrap(), 1);

        assert_eq!(table.resolve_constraint("a"), Some(2));
        assert_eq!(table.resolve_constraint("x"), None);
        assert_eq!(table.resolve_variable("x"), Some(1));
        assert_eq!(table.variable_name(1), Some("x"));
        assert_eq!(table.num_constraints(), 2);
        assert_eq!(table.num_variables(), 1);
    }

    #[test]
    fn test_reverse_lookup() {
        let mut table = SymbolTable::new();
        table.declare_constraint("c1").unwrap();
        assert_eq!(table.constraint_name(1), Some("c1"));
        assert_eq!(table.constraint_name(0), None);
        assert_eq!(table.constraint_name(2), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = SymbolTable::new();
        table.declare_constraint("c1").unwrap();
        assert!(matches!(
            table.declare_constraint("c1"),
            Err(CompileError::Schema(_))
        ));
        // Namespaces are separate.
        assert_eq!(table.declare_variable("c1").unwrap(), 1);
    }

    #[test]
    fn test_from_problem_keeps_unnamed_slots() {
        let mut problem = LpProblem::new();
        problem.add_rows(3);
        problem.set_row_name(1, "a");
        problem.set_row_name(3, "c");
        problem.add_cols(1);

        let mut table = SymbolTable::from_problem(&problem).unwrap();
        assert_eq!(table.resolve_constraint("c"), Some(3));
        assert_eq!(table.constraint_name(2), None);
        assert_eq!(table.num_constraints(), 3);
        assert_eq!(table.num_variables(), 1);
        assert_eq!(table.declare_constraint("d").unwrap(), 4);
    }
}
