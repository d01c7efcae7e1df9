//! Model loading: the compilation pipeline.
//!
//! A model is compiled in one strictly ordered pass:
//!
//! 1. problem name (optional)
//! 2. objective direction
//! 3. constraints: rows, names, bounds
//! 4. variables: columns, kinds, objective coefficients, base matrix entries
//! 5. bulk load of the base matrix
//! 6. dependent constraints, then a second bulk load of the full matrix
//!
//! The first error aborts the pass. The problem handle is then left partially
//! populated and should be discarded.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::constraints::compile_constraints;
use crate::dependent::compile_dependent_constraints;
use crate::document::DocumentExt;
use crate::error::{CompileError, Result};
use crate::problem::{Direction, ProblemHandle};
use crate::sparse::MatrixBuilder;
use crate::symbols::SymbolTable;
use crate::variables::compile_variables;

/// Compilation options.
///
/// Deserializable so it can be read from a config file; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Coefficients with `|v| <= zero_tolerance` are not stored.
    pub zero_tolerance: f64,
    /// Reject `values` keys that are neither the objective key nor a
    /// declared constraint.
    pub strict_values: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            zero_tolerance: 0.0,
            strict_values: false,
        }
    }
}

/// Compiles model documents into problem handles.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom options.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a full model document into `problem`.
    ///
    /// Rows and columns are appended after any already on the handle; a fresh
    /// handle yields indices starting at 1.
    pub fn compile<P: ProblemHandle + ?Sized>(&self, problem: &mut P, model: &Value) -> Result<()> {
        model.expect_object("model")?;

        if let Some(name) = model.get_field("name").and_then(Value::as_str) {
            problem.set_name(name);
        }

        problem.set_direction(direction(model)?);

        let objective = model.field("objective", "model")?.expect_str("model objective")?;
        let constraints = model
            .field("constraints", "model")?
            .expect_object("model constraints")?;
        let variables = model
            .field("variables", "model")?
            .expect_object("model variables")?;

        let mut symbols = SymbolTable::from_problem(&*problem)?;
        let mut builder = self.builder_for(&*problem);

        compile_constraints(problem, constraints, &mut symbols)?;
        compile_variables(
            problem,
            variables,
            objective,
            &mut symbols,
            &mut builder,
            self.options.strict_values,
        )?;
        builder.load(problem);

        let mut derived = 0;
        if let Some(dependents) = dependent_section(model)? {
            derived = compile_dependent_constraints(problem, dependents, &mut symbols, &mut builder)?;
            if derived > 0 {
                builder.load(problem);
            }
        }

        info!(
            rows = problem.num_rows(),
            cols = problem.num_cols(),
            entries = builder.len(),
            derived,
            "model compiled"
        );
        Ok(())
    }

    /// Derive dependent constraints on a problem that is already loaded.
    ///
    /// `dependents` is the mapping that would appear under
    /// `dependentConstraints` in a model. Names resolve against the rows
    /// already on the handle and coefficients are read from its current
    /// matrix; the full matrix is then loaded again.
    pub fn add_dependent_constraints<P: ProblemHandle + ?Sized>(
        &self,
        problem: &mut P,
        dependents: &Value,
    ) -> Result<()> {
        let dependents = dependents.expect_object("dependent constraints")?;
        let mut symbols = SymbolTable::from_problem(&*problem)?;
        let mut builder = self.builder_for(&*problem);

        let derived = compile_dependent_constraints(problem, dependents, &mut symbols, &mut builder)?;
        if derived > 0 {
            builder.load(problem);
        }
        debug!(derived, rows = problem.num_rows(), "dependent constraints added");
        Ok(())
    }

    fn builder_for<P: ProblemHandle + ?Sized>(&self, problem: &P) -> MatrixBuilder {
        MatrixBuilder::from_problem(problem, self.options.zero_tolerance)
    }
}

fn direction(model: &Value) -> Result<Direction> {
    let keyword = model
        .get_field("direction")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Direction::from_keyword(keyword).ok_or_else(|| {
        CompileError::schema("'direction' must be either 'minimize' or 'maximize'")
    })
}

/// The optional `dependentConstraints` section. `null` counts as absent.
fn dependent_section(model: &Value) -> Result<Option<&serde_json::Map<String, Value>>> {
    match model.get_field("dependentConstraints") {
        None | Some(Value::Null) => Ok(None),
        Some(section) => section.expect_object("model dependentConstraints").map(Some),
    }
}

/// Compile a model document with default options.
pub fn compile<P: ProblemHandle + ?Sized>(problem: &mut P, model: &Value) -> Result<()> {
    Compiler::new().compile(problem, model)
}

/// Add dependent constraints to a compiled problem with default options.
pub fn add_dependent_constraints<P: ProblemHandle + ?Sized>(
    problem: &mut P,
    dependents: &Value,
) -> Result<()> {
    Compiler::new().add_dependent_constraints(problem, dependents)
}
