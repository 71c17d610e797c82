//! The command surface of the engine and the key labels that map onto it.
//!
//! Button labels (`7`, `\u{d7}`, `1/x`, `CE`) and keyboard names (`Enter`,
//! `Escape`, `Backspace`) both resolve to a [`Command`]. A typed line such as
//! `12 * 3 =` is split into individual keys by [`tokenize`].

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::CalcError;
use super::operation::{BinaryOperator, Digit, UnaryOperation};

lazy_static! {
    /// One key per match. Longer labels come first so `CE` wins over `C`
    /// and `1/x` wins over the digit `1`.
    static ref KEY: Regex = Regex::new(
        r"Backspace|Escape|Delete|Enter|Esc|Del|CE|C|1/x|\+/-|sqrt|inv|neg|\d|[.,+\-*/x\x{d7}\x{f7}=%\x{221a}\x{2190}\x{b1}]"
    ).unwrap();
}

/// A single instruction sent to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Digit(Digit),
    DecimalPoint,
    Binary(BinaryOperator),
    Evaluate,
    Unary(UnaryOperation),
    ClearEntry,
    ClearAll,
    Backspace,
}

impl Command {
    /// Resolve a button label or keyboard key name.
    pub fn from_key(key: &str) -> Result<Self, CalcError> {
        let key = key.trim();
        match key {
            "." | "," => return Ok(Self::DecimalPoint),
            "=" | "Enter" => return Ok(Self::Evaluate),
            "CE" | "Delete" | "Del" => return Ok(Self::ClearEntry),
            "C" | "Escape" | "Esc" => return Ok(Self::ClearAll),
            "\u{2190}" | "Backspace" => return Ok(Self::Backspace),
            _ => {}
        }

        if let [byte @ b'0'..=b'9'] = key.as_bytes() {
            return Digit::try_from(byte - b'0').map(Self::Digit);
        }
        if let Ok(op) = key.parse::<BinaryOperator>() {
            return Ok(Self::Binary(op));
        }
        if let Ok(op) = key.parse::<UnaryOperation>() {
            return Ok(Self::Unary(op));
        }

        Err(CalcError::UnknownKey(key.to_string()))
    }
}

impl FromStr for Command {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

/// Split a typed line into key labels.
///
/// Whitespace between keys is ignored; anything else that is not a key is
/// reported as [`CalcError::UnknownKey`].
pub fn tokenize(line: &str) -> Result<Vec<&str>, CalcError> {
    let mut keys = Vec::new();
    let mut last_end = 0;

    for found in KEY.find_iter(line) {
        check_gap(&line[last_end..found.start()])?;
        keys.push(found.as_str());
        last_end = found.end();
    }
    check_gap(&line[last_end..])?;

    Ok(keys)
}

/// Tokenize a line and resolve every key to a command.
pub fn parse_keys(line: &str) -> Result<Vec<Command>, CalcError> {
    tokenize(line)?.into_iter().map(Command::from_key).collect()
}

fn check_gap(gap: &str) -> Result<(), CalcError> {
    let gap = gap.trim();
    if gap.is_empty() {
        Ok(())
    } else {
        Err(CalcError::UnknownKey(gap.to_string()))
    }
}
