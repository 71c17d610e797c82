//! Error types for the calculator engine.
//!
//! Two kinds of failure exist. [`CalcError`] means the caller sent something
//! the engine cannot accept (a digit outside 0-9, an unknown key). It is
//! returned immediately and never changes engine state. [`ArithmeticError`]
//! is a user-facing math condition that latches the engine into error mode
//! until it is cleared.

use thiserror::Error;

/// An arithmetic condition that puts the engine into error mode.
///
/// The `Display` text is shown verbatim on the current line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Cannot divide by zero")]
    DivideByZero,
    #[error("Invalid input")]
    InvalidInput,
}

/// A contract violation by the caller of the engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("digit must be between 0 and 9, got {0}")]
    InvalidDigit(u8),
    #[error("operator cannot be blank")]
    BlankOperator,
    #[error("unknown operator {0:?}")]
    UnknownOperator(String),
    #[error("unknown unary operation {0:?}")]
    UnknownUnaryOperation(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("input buffer {0:?} is not a decimal number")]
    MalformedBuffer(String),
}
