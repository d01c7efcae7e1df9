//! # lpmodel
//!
//! Compiles declarative linear and mixed-integer model documents into the
//! row/column/coefficient structures an LP/MIP solver consumes.
//!
//! A model names its constraints and variables; variables list their
//! coefficients against constraints by name. Dependent constraints build new
//! rows as affine transforms of rows already compiled.
//!
//! ## Quick Start
//!
//! ```
//! use lpmodel::prelude::*;
//! use serde_json::json;
//!
//! let model = json!({
//!     "direction": "minimize",
//!     "objective": "cost",
//!     "constraints": {"c1": {"upper": 10}},
//!     "variables": {
//!         "x": {"kind": "continuous", "values": {"cost": 2, "c1": 1}}
//!     }
//! });
//!
//! let mut problem = LpProblem::new();
//! compile(&mut problem, &model)?;
//!
//! assert_eq!(problem.num_rows(), 1);
//! assert_eq!(problem.row(1).unwrap().bound, Bound::upper(10.0));
//! assert_eq!(problem.col(1).unwrap().objective, 2.0);
//! # Ok::<(), lpmodel::CompileError>(())
//! ```
//!
//! ## Constraint operations
//!
//! | operation | bound |
//! |---|---|
//! | `max: u` | `0 <= row <= u` |
//! | `range: [l, u]` | `l <= row <= u`, requires `l < u` |
//! | `lower: l` | `row >= l` |
//! | `upper: u` | `row <= u` |
//! | `equal: v` | `row = v` |
//! | `unbounded` / `free` | free |
//!
//! ## Architecture
//!
//! - **Document access** through [`document::DocumentExt`], which validates
//!   every read
//! - **Symbol table** mapping names to 1-based rows and columns
//! - **Matrix builder** holding a coordinate list that is bulk-loaded into a
//!   [`ProblemHandle`]
//! - **Dependent constraints** derived after the base matrix is loaded
//! - **[`LpProblem`]**, an in-memory handle exporting nalgebra-sparse
//!   matrices

pub mod constraints;
pub mod dependent;
pub mod document;
pub mod error;
pub mod loader;
pub mod problem;
pub mod sparse;
pub mod symbols;
pub mod variables;

/// Prelude module for convenient imports.
///
/// ```
/// use lpmodel::prelude::*;
/// ```
pub mod prelude {
    // Entry points
    pub use crate::loader::{add_dependent_constraints, compile, CompileOptions, Compiler};

    // Problem handles
    pub use crate::problem::{Column, Direction, LpProblem, ProblemHandle, Row};

    // Compiled structure
    pub use crate::constraints::{Bound, BoundType};
    pub use crate::dependent::Term;
    pub use crate::sparse::SparseEntry;
    pub use crate::variables::VariableKind;

    // Errors
    pub use crate::error::{CompileError, Result};
}

// Re-export main types at crate root
pub use error::{CompileError, Result};
pub use loader::{add_dependent_constraints, compile, CompileOptions, Compiler};
pub use problem::{LpProblem, ProblemHandle};
