//! Sparse coefficient assembly.
//!
//! [`MatrixBuilder`] accumulates a coordinate list in the solver's 1-based
//! layout: three parallel arrays whose element 0 is an unused sentinel. The
//! helpers at the bottom convert entry lists to nalgebra-sparse matrices
//! (0-based) for consumers that want a compressed format.

use std::collections::HashMap;

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};
use tracing::{debug, trace};

use crate::problem::ProblemHandle;

/// A nonzero coefficient at a 1-based (row, column) position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseEntry {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl SparseEntry {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        SparseEntry { row, col, value }
    }
}

/// Append-only coordinate list with an explicit bulk commit.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
    /// Row index -> positions in the parallel arrays.
    by_row: HashMap<usize, Vec<usize>>,
    zero_tolerance: f64,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        MatrixBuilder::new()
    }
}

impl MatrixBuilder {
    /// Create an empty builder that drops exact zeros.
    pub fn new() -> Self {
        MatrixBuilder {
            rows: vec![0],
            cols: vec![0],
            values: vec![0.0],
            by_row: HashMap::new(),
            zero_tolerance: 0.0,
        }
    }

    /// Drop values with `|v| <= tol` instead of only exact zeros.
    pub fn with_zero_tolerance(mut self, tol: f64) -> Self {
        self.zero_tolerance = tol.max(0.0);
        self
    }

    /// Start from the matrix already loaded on a problem handle.
    ///
    /// Loaded entries are kept as they are; `zero_tolerance` applies only to
    /// entries pushed afterwards.
    pub fn from_problem<P: ProblemHandle + ?Sized>(problem: &P, zero_tolerance: f64) -> Self {
        let mut builder = MatrixBuilder::new().with_zero_tolerance(zero_tolerance);
        for entry in problem.matrix_entries() {
            if entry.value != 0.0 {
                builder.insert(entry.row, entry.col, entry.value);
            }
        }
        builder
    }

    /// Whether `value` is dropped by this builder.
    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.zero_tolerance
    }

    /// Record an entry. Returns `false` if the value was dropped as zero.
    pub fn push(&mut self, row: usize, col: usize, value: f64) -> bool {
        if self.is_zero(value) {
            trace!(row, col, "dropping zero coefficient");
            return false;
        }
        self.insert(row, col, value);
        true
    }

    fn insert(&mut self, row: usize, col: usize, value: f64) {
        let pos = self.values.len();
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
        self.by_row.entry(row).or_default().push(pos);
    }

    /// Number of stored entries, excluding the sentinel.
    pub fn len(&self) -> usize {
        self.values.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over stored entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = SparseEntry> + '_ {
        (1..self.values.len()).map(move |i| SparseEntry::new(self.rows[i], self.cols[i], self.values[i]))
    }

    /// The `(column, value)` pairs stored for one row, in insertion order.
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        self.by_row
            .get(&row)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&i| (self.cols[i], self.values[i]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transmit the complete entry list to the problem in one bulk load.
    ///
    /// A later call supersedes the earlier one; it is not an append.
    pub fn load<P: ProblemHandle + ?Sized>(&self, problem: &mut P) {
        debug!(entries = self.len(), "loading constraint matrix");
        problem.load_matrix(&self.rows, &self.cols, &self.values);
    }
}

/// Build a 0-based COO matrix from 1-based entries, skipping out-of-range ones.
fn coo_from_entries(nrows: usize, ncols: usize, entries: &[SparseEntry]) -> CooMatrix<f64> {
    let mut coo = CooMatrix::new(nrows, ncols);
    for e in entries {
        if e.row >= 1 && e.row <= nrows && e.col >= 1 && e.col <= ncols {
            coo.push(e.row - 1, e.col - 1, e.value);
        }
    }
    coo
}

/// Row-major matrix from 1-based entries. Duplicates are summed together.
pub fn csr_from_entries(nrows: usize, ncols: usize, entries: &[SparseEntry]) -> CsrMatrix<f64> {
    if entries.is_empty() {
        return CsrMatrix::zeros(nrows, ncols);
    }
    CsrMatrix::from(&coo_from_entries(nrows, ncols, entries))
}

/// Column-major matrix from 1-based entries. Duplicates are summed together.
pub fn csc_from_entries(nrows: usize, ncols: usize, entries: &[SparseEntry]) -> CscMatrix<f64> {
    if entries.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }
    CscMatrix::from(&coo_from_entries(nrows, ncols, entries))
}

/// Convert CSR to a dense matrix.
pub fn csr_to_dense(sparse: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] = *val;
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    #[test]
    fn test_sentinel_and_zero_skipping() {
        let mut builder = MatrixBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.push(1, 1, 2.0));
        assert!(!builder.push(1, 2, 0.0));
        assert!(!builder.push(1, 3, -0.0));
        assert!(builder.push(2, 1, 1e-12));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.rows[0], 0);
        assert_eq!(builder.cols[0], 0);
    }

    #[test]
    fn test_zero_tolerance() {
        let mut builder = MatrixBuilder::new().with_zero_tolerance(1e-9);
        assert!(!builder.push(1, 1, 1e-12));
        assert!(builder.push(1, 1, 1e-3));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_row_entries() {
        let mut builder = MatrixBuilder::new();
        builder.push(1, 2, 3.0);
        builder.push(2, 1, 4.0);
        builder.push(1, 1, 5.0);
        assert_eq!(builder.row_entries(1), vec![(2, 3.0), (1, 5.0)]);
        assert_eq!(builder.row_entries(2), vec![(1, 4.0)]);
        assert!(builder.row_entries(9).is_empty());
    }

    #[test]
    fn test_load_supersedes() {
        let mut problem = LpProblem::new();
        problem.add_rows(2);
        problem.add_cols(2);

        let mut builder = MatrixBuilder::new();
        builder.push(1, 1, 1.0);
        builder.load(&mut problem);
        assert_eq!(problem.num_nonzeros(), 1);

        builder.push(2, 2, 2.0);
        builder.load(&mut problem);
        assert_eq!(problem.num_nonzeros(), 2);

        let seeded = MatrixBuilder::from_problem(&problem, 0.0);
        assert_eq!(seeded.entries().collect::<Vec<_>>(), builder.entries().collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_entries_ignore_tolerance() {
        let mut problem = LpProblem::new();
        problem.add_rows(2);
        problem.add_cols(1);
        let mut builder = MatrixBuilder::new();
        builder.push(1, 1, 1e-6);
        builder.push(2, 1, 1.0);
        builder.load(&mut problem);

        let mut seeded = MatrixBuilder::from_problem(&problem, 1e-3);
        assert_eq!(seeded.len(), 2);
        assert_eq!(seeded.row_entries(1), vec![(1, 1e-6)]);
        // New entries still go through the tolerance.
        assert!(!seeded.push(2, 1, 1e-4));
        assert_eq!(seeded.len(), 2);
    }

    #[test]
    fn test_csr_from_entries() {
        let entries = vec![
            SparseEntry::new(1, 1, 1.0),
            SparseEntry::new(2, 3, 2.0),
            SparseEntry::new(5, 1, 9.0), // out of range
        ];
        let m = csr_from_entries(2, 3, &entries);
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.nnz(), 2);

        let dense = csr_to_dense(&m);
        assert_eq!(dense[(1, 2)], 2.0);
        assert_eq!(dense[(0, 1)], 0.0);
    }

    #[test]
    fn test_empty_matrices() {
        assert_eq!(csr_from_entries(2, 2, &[]).nnz(), 0);
        assert_eq!(csc_from_entries(3, 1, &[]).ncols(), 1);
    }
}
