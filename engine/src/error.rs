//! FILENAME: engine/src/error.rs
//! PURPOSE: Error types for evaluation and assignment.
//! CONTEXT: `EvalError` is produced by the evaluator while walking an
//! expression; `AssignError` is the coordinator-level outcome reported
//! back to whatever issued the assignment, and its `Display` is the
//! exact status text shown in the REPL prompt.

use thiserror::Error;

/// Failures that can occur while evaluating a single expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivByZero,
    /// A cell this expression reads from is itself in an error state.
    #[error("dependency error")]
    DependencyError,
    #[error("reference out of bounds")]
    RefOutOfBounds,
    /// A range's start corner is not above-and-left of its end corner.
    #[error("invalid range")]
    InvalidRange,
}

/// The outcome of assigning a formula to a cell, as reported to the
/// caller and rendered verbatim in the REPL status line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    #[error("Invalid cell")]
    InvalidCell,
    #[error("Cell out of bounds")]
    OutOfBounds,
    #[error("Invalid formula")]
    InvalidFormula,
    #[error("Invalid range")]
    InvalidRange,
    #[error("Reference out of bounds")]
    RefOutOfBounds,
    #[error("Circular dependency detected in cell {0}")]
    Circular(String),
}
