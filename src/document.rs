//! Fallible accessors over the input document.
//!
//! The compiler reads a `serde_json::Value` tree. Every access goes through
//! [`DocumentExt`], which turns a shape mismatch into a [`CompileError::Schema`]
//! naming the entity being read instead of a panic or a silent default.

use serde_json::{Map, Value};

use crate::error::{CompileError, Result};

/// Name of a value's variant, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extension trait for validated reads from a document node.
///
/// `context` describes the node being read (for example `constraint 'c1'`)
/// and is embedded in any error.
pub trait DocumentExt {
    /// Look up an optional field. Returns `None` for non-objects.
    fn get_field(&self, key: &str) -> Option<&Value>;

    /// Look up a required field.
    fn field(&self, key: &str, context: &str) -> Result<&Value>;

    /// Require an object.
    fn expect_object(&self, context: &str) -> Result<&Map<String, Value>>;

    /// Require a finite number.
    fn expect_number(&self, context: &str) -> Result<f64>;

    /// Require a string.
    fn expect_str(&self, context: &str) -> Result<&str>;

    /// Require an array.
    fn expect_array(&self, context: &str) -> Result<&[Value]>;
}

impl DocumentExt for Value {
    fn get_field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    fn field(&self, key: &str, context: &str) -> Result<&Value> {
        let obj = self.expect_object(context)?;
        obj.get(key)
            .ok_or_else(|| CompileError::schema(format!("{}: missing required field '{}'", context, key)))
    }

    fn expect_object(&self, context: &str) -> Result<&Map<String, Value>> {
        self.as_object()
            .ok_or_else(|| mismatch(context, "an object", self))
    }

    fn expect_number(&self, context: &str) -> Result<f64> {
        match self {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CompileError::schema(format!("{}: number {} is not representable", context, n))),
            other => Err(mismatch(context, "a number", other)),
        }
    }

    fn expect_str(&self, context: &str) -> Result<&str> {
        self.as_str().ok_or_else(|| mismatch(context, "a string", self))
    }

    fn expect_array(&self, context: &str) -> Result<&[Value]> {
        self.as_array()
            .map(|arr| arr.as_slice())
            .ok_or_else(|| mismatch(context, "an array", self))
    }
}

fn mismatch(context: &str, expected: &str, found: &Value) -> CompileError {
    CompileError::schema(format!(
        "{}: expected {}, found {}",
        context,
        expected,
        kind_name(found)
    ))
}
