//! Solver-side problem handles.
//!
//! [`ProblemHandle`] is the set of structural mutations the compiler performs
//! on a solver's problem object: row and column counts, names, kinds, bounds,
//! objective direction and coefficients, and the bulk matrix load. Indices are
//! 1-based throughout.
//!
//! [`LpProblem`] is an in-memory implementation that keeps the compiled
//! structure and exposes the matrix in nalgebra-sparse formats.

use std::collections::HashMap;

use nalgebra::DMatrix;
use nalgebra_sparse::{CscMatrix, CsrMatrix};

use crate::constraints::Bound;
use crate::sparse::{csc_from_entries, csr_from_entries, csr_to_dense, SparseEntry};
use crate::variables::VariableKind;

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Parse `"minimize"` or `"maximize"`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "minimize" => Some(Direction::Minimize),
            "maximize" => Some(Direction::Maximize),
            _ => None,
        }
    }

    pub fn is_minimize(&self) -> bool {
        matches!(self, Direction::Minimize)
    }
}

/// Structural interface of a solver's problem object.
///
/// Setters addressing a row or column that does not exist are ignored by
/// implementations; the compiler only addresses indices it has added.
pub trait ProblemHandle {
    fn set_name(&mut self, name: &str);

    fn set_direction(&mut self, direction: Direction);

    /// Append `count` rows. Returns the index of the first new row.
    fn add_rows(&mut self, count: usize) -> usize;

    /// Append `count` columns. Returns the index of the first new column.
    fn add_cols(&mut self, count: usize) -> usize;

    fn set_row_name(&mut self, row: usize, name: &str);

    fn set_row_bounds(&mut self, row: usize, bound: Bound);

    fn set_col_name(&mut self, col: usize, name: &str);

    fn set_col_kind(&mut self, col: usize, kind: VariableKind);

    fn set_obj_coef(&mut self, col: usize, coef: f64);

    /// Replace the whole constraint matrix.
    ///
    /// The three slices are parallel and element 0 of each is unused, so the
    /// number of entries is `values.len() - 1`.
    fn load_matrix(&mut self, rows: &[usize], cols: &[usize], values: &[f64]);

    fn num_rows(&self) -> usize;

    fn num_cols(&self) -> usize;

    fn row_name(&self, row: usize) -> Option<&str>;

    fn col_name(&self, col: usize) -> Option<&str>;

    /// The currently loaded matrix entries.
    fn matrix_entries(&self) -> Vec<SparseEntry>;
}

/// A compiled constraint row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: Option<String>,
    pub bound: Bound,
}

/// A compiled variable column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Option<String>,
    pub kind: VariableKind,
    pub bound: Bound,
    pub objective: f64,
}

impl Default for Column {
    fn default() -> Self {
        Column {
            name: None,
            kind: VariableKind::Continuous,
            bound: Bound::lower(0.0),
            objective: 0.0,
        }
    }
}

/// In-memory problem handle.
#[derive(Debug, Clone, Default)]
pub struct LpProblem {
    name: Option<String>,
    direction: Direction,
    rows: Vec<Row>,
    cols: Vec<Column>,
    row_index: HashMap<String, usize>,
    col_index: HashMap<String, usize>,
    entries: Vec<SparseEntry>,
}

impl LpProblem {
    /// Create an empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Get a row by 1-based index.
    pub fn row(&self, row: usize) -> Option<&Row> {
        row.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Get a column by 1-based index.
    pub fn col(&self, col: usize) -> Option<&Column> {
        col.checked_sub(1).and_then(|i| self.cols.get(i))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cols(&self) -> &[Column] {
        &self.cols
    }

    /// Find a row index by name.
    pub fn find_row(&self, name: &str) -> Option<usize> {
        self.row_index.get(name).copied()
    }

    /// Find a column index by name.
    pub fn find_col(&self, name: &str) -> Option<usize> {
        self.col_index.get(name).copied()
    }

    /// Number of integer and binary columns.
    pub fn num_int(&self) -> usize {
        self.cols.iter().filter(|c| c.kind.is_integral()).count()
    }

    /// Number of loaded matrix entries.
    pub fn num_nonzeros(&self) -> usize {
        self.entries.len()
    }

    /// Loaded entries in load order.
    pub fn entries(&self) -> &[SparseEntry] {
        &self.entries
    }

    /// `(column, value)` pairs of one row, sorted by column.
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.row == row)
            .map(|e| (e.col, e.value))
            .collect();
        out.sort_by_key(|(col, _)| *col);
        out
    }

    /// Objective coefficients indexed by column (0-based).
    pub fn objective(&self) -> Vec<f64> {
        self.cols.iter().map(|c| c.objective).collect()
    }

    /// The constraint matrix in row-major form (0-based).
    pub fn constraint_matrix(&self) -> CsrMatrix<f64> {
        csr_from_entries(self.rows.len(), self.cols.len(), &self.entries)
    }

    /// The constraint matrix in column-major form (0-based).
    pub fn constraint_matrix_csc(&self) -> CscMatrix<f64> {
        csc_from_entries(self.rows.len(), self.cols.len(), &self.entries)
    }

    /// Dense copy of the constraint matrix, for inspection.
    pub fn to_dense(&self) -> DMatrix<f64> {
        csr_to_dense(&self.constraint_matrix())
    }

    fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        row.checked_sub(1).and_then(move |i| self.rows.get_mut(i))
    }

    fn col_mut(&mut self, col: usize) -> Option<&mut Column> {
        col.checked_sub(1).and_then(move |i| self.cols.get_mut(i))
    }
}

/// Rename slot `index`, keeping the name -> index map in sync.
fn rename(
    index_of: &mut HashMap<String, usize>,
    slot: &mut Option<String>,
    index: usize,
    name: &str,
) {
    if let Some(old) = slot.take() {
        if index_of.get(&old) == Some(&index) {
            index_of.remove(&old);
        }
    }
    index_of.insert(name.to_string(), index);
    *slot = Some(name.to_string());
}

impl ProblemHandle for LpProblem {
    fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn add_rows(&mut self, count: usize) -> usize {
        let first = self.rows.len() + 1;
        self.rows.extend((0..count).map(|_| Row {
            name: None,
            bound: Bound::free(),
        }));
        first
    }

    fn add_cols(&mut self, count: usize) -> usize {
        let first = self.cols.len() + 1;
        self.cols.extend((0..count).map(|_| Column::default()));
        first
    }

    fn set_row_name(&mut self, row: usize, name: &str) {
        if let Some(i) = row.checked_sub(1).filter(|&i| i < self.rows.len()) {
            rename(&mut self.row_index, &mut self.rows[i].name, row, name);
        }
    }

    fn set_row_bounds(&mut self, row: usize, bound: Bound) {
        if let Some(r) = self.row_mut(row) {
            r.bound = bound;
        }
    }

    fn set_col_name(&mut self, col: usize, name: &str) {
        if let Some(i) = col.checked_sub(1).filter(|&i| i < self.cols.len()) {
            rename(&mut self.col_index, &mut self.cols[i].name, col, name);
        }
    }

    fn set_col_kind(&mut self, col: usize, kind: VariableKind) {
        if let Some(c) = self.col_mut(col) {
            c.kind = kind;
            if kind == VariableKind::Binary {
                c.bound = Bound::double(0.0, 1.0);
            }
        }
    }

    fn set_obj_coef(&mut self, col: usize, coef: f64) {
        if let Some(c) = self.col_mut(col) {
            c.objective = coef;
        }
    }

    fn load_matrix(&mut self, rows: &[usize], cols: &[usize], values: &[f64]) {
        self.entries = rows
            .iter()
            .zip(cols)
            .zip(values)
            .skip(1)
            .map(|((&row, &col), &value)| SparseEntry::new(row, col, value))
            .collect();
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_cols(&self) -> usize {
        self.cols.len()
    }

    fn row_name(&self, row: usize) -> Option<&str> {
        self.row(row).and_then(|r| r.name.as_deref())
    }

    fn col_name(&self, col: usize) -> Option<&str> {
        self.col(col).and_then(|c| c.name.as_deref())
    }

    fn matrix_entries(&self) -> Vec<SparseEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_keywords() {
        assert_eq!(Direction::from_keyword("minimize"), Some(Direction::Minimize));
        assert_eq!(Direction::from_keyword("maximize"), Some(Direction::Maximize));
        assert_eq!(Direction::from_keyword("Maximize"), None);
        assert!(Direction::default().is_minimize());
    }

    #[test]
    fn test_add_rows_and_cols() {
        let mut p = LpProblem::new();
        assert_eq!(p.add_rows(2), 1);
        assert_eq!(p.add_rows(1), 3);
        assert_eq!(p.add_cols(4), 1);
        assert_eq!(p.num_rows(), 3);
        assert_eq!(p.num_cols(), 4);
        assert_eq!(p.col(1).unwrap().bound, Bound::lower(0.0));
    }

    #[test]
    fn test_names_and_lookup() {
        let mut p = LpProblem::new();
        p.add_rows(2);
        p.set_row_name(1, "a");
        p.set_row_name(2, "b");
        assert_eq!(p.find_row("b"), Some(2));

        p.set_row_name(2, "c");
        assert_eq!(p.find_row("b"), None);
        assert_eq!(p.find_row("c"), Some(2));
        assert_eq!(p.row_name(2), Some("c"));

        // Out of range is ignored.
        p.set_row_name(7, "z");
        assert_eq!(p.find_row("z"), None);
    }

    #[test]
    fn test_binary_kind_sets_unit_bounds() {
        let mut p = LpProblem::new();
        p.add_cols(3);
        p.set_col_kind(1, VariableKind::Binary);
        p.set_col_kind(2, VariableKind::Integer);
        assert_eq!(p.col(1).unwrap().bound, Bound::double(0.0, 1.0));
        assert_eq!(p.col(2).unwrap().bound, Bound::lower(0.0));
        assert_eq!(p.num_int(), 2);
    }

    #[test]
    fn test_load_matrix_skips_sentinel() {
        let mut p = LpProblem::new();
        p.add_rows(2);
        p.add_cols(2);
        p.load_matrix(&[0, 1, 2], &[0, 2, 1], &[0.0, 3.0, 4.0]);
        assert_eq!(p.num_nonzeros(), 2);
        assert_eq!(p.row_entries(1), vec![(2, 3.0)]);

        let csr = p.constraint_matrix();
        assert_eq!(csr.nnz(), 2);
        let dense = p.to_dense();
        assert_eq!(dense[(0, 1)], 3.0);
        assert_eq!(dense[(1, 0)], 4.0);
        assert_eq!(p.constraint_matrix_csc().nnz(), 2);
    }
}
