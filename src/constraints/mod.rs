//! Constraint compilation.
//!
//! Each declared constraint carries exactly one bound operation, which is
//! reduced to a canonical [`Bound`] and set on its row. Coefficients are
//! filled in later by the variable compiler.

pub mod bound;
pub mod compiler;

pub use bound::{compile_bound, Bound, BoundType, Operation};
pub use compiler::compile_constraints;
