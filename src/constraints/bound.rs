//! Row bounds and the bound-operation vocabulary.
//!
//! Every constraint operation reduces to a [`Bound`]:
//! - `max`: double-bounded on `[0, operand]`
//! - `range`: double-bounded on `[operand[0], operand[1]]`
//! - `lower`: lower-only at `operand`
//! - `upper`: upper-only at `operand`
//! - `equal`: fixed at `operand`
//! - `unbounded` / `free`: free

use serde_json::Value;

use crate::document::DocumentExt;
use crate::error::{CompileError, Result};

/// Canonical classification of a feasible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundType {
    /// -inf < x < +inf
    Free,
    /// lower <= x < +inf
    Lower,
    /// -inf < x <= upper
    Upper,
    /// lower <= x <= upper
    Double,
    /// x = lower = upper
    Fixed,
}

/// A bound triple. Components not used by `kind` are stored as 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub kind: BoundType,
    pub lower: f64,
    pub upper: f64,
}

impl Bound {
    pub fn free() -> Self {
        Bound {
            kind: BoundType::Free,
            lower: 0.0,
            upper: 0.0,
        }
    }

    pub fn lower(lower: f64) -> Self {
        Bound {
            kind: BoundType::Lower,
            lower,
            upper: 0.0,
        }
    }

    pub fn upper(upper: f64) -> Self {
        Bound {
            kind: BoundType::Upper,
            lower: 0.0,
            upper,
        }
    }

    pub fn double(lower: f64, upper: f64) -> Self {
        Bound {
            kind: BoundType::Double,
            lower,
            upper,
        }
    }

    pub fn fixed(value: f64) -> Self {
        Bound {
            kind: BoundType::Fixed,
            lower: value,
            upper: value,
        }
    }
}

/// A bound operation keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Max,
    Range,
    Lower,
    Upper,
    Equal,
    /// Spelled `unbounded` or `free`.
    Free,
}

impl Operation {
    /// Parse a keyword. Returns `None` outside the vocabulary.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "max" => Some(Operation::Max),
            "range" => Some(Operation::Range),
            "lower" => Some(Operation::Lower),
            "upper" => Some(Operation::Upper),
            "equal" => Some(Operation::Equal),
            "unbounded" | "free" => Some(Operation::Free),
            _ => None,
        }
    }

    /// Reduce this operation and its operand to a bound.
    ///
    /// `owner` is the constraint name used in errors.
    pub fn bound(self, owner: &str, operand: &Value) -> Result<Bound> {
        let context = format!("operand of constraint '{}'", owner);
        match self {
            Operation::Max => Ok(Bound::double(0.0, operand.expect_number(&context)?)),
            Operation::Range => {
                let pair = operand.expect_array(&context)?;
                if pair.len() != 2 {
                    return Err(CompileError::schema(format!(
                        "{}: 'range' takes exactly two numbers, found {}",
                        context,
                        pair.len()
                    )));
                }
                let lower = pair[0].expect_number(&context)?;
                let upper = pair[1].expect_number(&context)?;
                if lower >= upper {
                    return Err(CompileError::InvalidRange {
                        name: owner.to_string(),
                        lower,
                        upper,
                    });
                }
                Ok(Bound::double(lower, upper))
            }
            Operation::Lower => Ok(Bound::lower(operand.expect_number(&context)?)),
            Operation::Upper => Ok(Bound::upper(operand.expect_number(&context)?)),
            Operation::Equal => Ok(Bound::fixed(operand.expect_number(&context)?)),
            // Operand is not inspected.
            Operation::Free => Ok(Bound::free()),
        }
    }
}

/// Compile a `(keyword, operand)` pair into a bound.
pub fn compile_bound(owner: &str, keyword: &str, operand: &Value) -> Result<Bound> {
    let op = Operation::from_keyword(keyword).ok_or_else(|| CompileError::UnrecognizedOperation {
        name: owner.to_string(),
        operation: keyword.to_string(),
    })?;
    op.bound(owner, operand)
}
