//! Closed sets of calculator inputs: digits, binary operators and unary operations.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::decimal;
use super::error::{ArithmeticError, CalcError};

/// A single decimal digit, 0 through 9.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Digit(u8);

impl Digit {
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = CalcError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 9 {
            Ok(Self(value))
        } else {
            Err(CalcError::InvalidDigit(value))
        }
    }
}

/// An operator taking the accumulator and the current input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// The glyph shown in the history line.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "\u{d7}",
            Self::Divide => "\u{f7}",
        }
    }

    /// Apply the operator at working precision.
    pub fn apply(
        self,
        left: &BigDecimal,
        right: &BigDecimal,
    ) -> Result<BigDecimal, ArithmeticError> {
        match self {
            Self::Add => Ok(decimal::add(left, right)),
            Self::Subtract => Ok(decimal::sub(left, right)),
            Self::Multiply => Ok(decimal::mul(left, right)),
            Self::Divide => decimal::div(left, right),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BinaryOperator {
    type Err = CalcError;

    /// Accepts the display glyphs and the ASCII keys typed on a keyboard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(CalcError::BlankOperator),
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "\u{d7}" | "*" | "x" | "X" => Ok(Self::Multiply),
            "\u{f7}" | "/" => Ok(Self::Divide),
            other => Err(CalcError::UnknownOperator(other.to_string())),
        }
    }
}

/// An operation on the current input alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperation {
    SquareRoot,
    Reciprocal,
    Percent,
    Negate,
}

impl UnaryOperation {
    /// The key label for this operation.
    pub fn label(self) -> &'static str {
        match self {
            Self::SquareRoot => "\u{221a}",
            Self::Reciprocal => "1/x",
            Self::Percent => "%",
            Self::Negate => "+/-",
        }
    }
}

impl fmt::Display for UnaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnaryOperation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "\u{221a}" | "sqrt" => Ok(Self::SquareRoot),
            "1/x" | "inv" => Ok(Self::Reciprocal),
            "%" => Ok(Self::Percent),
            "+/-" | "\u{b1}" | "neg" => Ok(Self::Negate),
            other => Err(CalcError::UnknownUnaryOperation(other.to_string())),
        }
    }
}
