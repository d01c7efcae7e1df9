//! Load Model Example
//!
//! Compiles a small diet model with a dependent constraint and prints the
//! resulting rows, columns and constraint matrix.
//!
//! Run with `RUST_LOG=lpmodel=debug` to see the compilation stages.

use lpmodel::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Load Model ===\n");

    // minimize 0.6*oats + 1.2*milk + 2.5*eggs
    // subject to:
    //   4*oats + 8*milk + 6*eggs >= 20   (protein)
    //   2*oats + 5*milk + 5*eggs <= 12   (fat)
    //   eggs in {0, 1, 2, ...}
    let model = json!({
        "name": "diet",
        "direction": "minimize",
        "objective": "cost",
        "constraints": {
            "protein": {"lower": 20},
            "fat": {"upper": 12}
        },
        "variables": {
            "oats": {"kind": "continuous", "values": {"cost": 0.6, "protein": 4, "fat": 2}},
            "milk": {"kind": "continuous", "values": {"cost": 1.2, "protein": 8, "fat": 5}},
            "eggs": {"kind": "integer", "values": {"cost": 2.5, "protein": 6, "fat": 5, "unit": "dozen"}}
        },
        "dependentConstraints": {
            "lean": {
                "terms": {
                    "protein": {"coefficient": 1, "constant": 0},
                    "fat": {"coefficient": -2, "constant": 0}
                },
                "lower": 0
            }
        }
    });

    let mut problem = LpProblem::new();
    if let Err(e) = compile(&mut problem, &model) {
        eprintln!("Compilation failed: {}", e);
        std::process::exit(1);
    }

    println!(
        "Problem '{}' ({:?}): {} rows, {} columns, {} nonzeros, {} integer\n",
        problem.name().unwrap_or("<unnamed>"),
        problem.direction(),
        problem.num_rows(),
        problem.num_cols(),
        problem.num_nonzeros(),
        problem.num_int()
    );

    println!("Rows:");
    for (i, row) in problem.rows().iter().enumerate() {
        println!(
            "  {:>2} {:<8} {:?} [{}, {}]",
            i + 1,
            row.name.as_deref().unwrap_or("-"),
            row.bound.kind,
            row.bound.lower,
            row.bound.upper
        );
    }

    println!("\nColumns:");
    for (j, col) in problem.cols().iter().enumerate() {
        println!(
            "  {:>2} {:<8} {:?} objective = {}",
            j + 1,
            col.name.as_deref().unwrap_or("-"),
            col.kind,
            col.objective
        );
    }

    println!("\nConstraint matrix:{}", problem.to_dense());
}
