//! The text of the number currently being typed.

use bigdecimal::BigDecimal;
use num_traits::Zero;

use super::decimal;
use super::error::CalcError;
use super::operation::Digit;

/// An editable decimal number: an optional leading `-`, digits, and at most
/// one `.`. It is never empty; `"0"` is the cleared state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self {
            text: "0".to_string(),
        }
    }
}

impl InputBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn has_decimal_point(&self) -> bool {
        self.text.contains('.')
    }

    /// Replace the contents, e.g. with a formatted result.
    pub fn overwrite(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.overwrite("0");
    }

    /// Append a digit, replacing a lone `0` instead of growing leading zeros.
    pub fn push_digit(&mut self, digit: Digit) {
        if self.text == "0" {
            self.text.clear();
        }
        self.text.push(digit.as_char());
    }

    /// Append `.` unless the number already has one.
    pub fn push_decimal_point(&mut self) {
        if !self.has_decimal_point() {
            self.text.push('.');
        }
    }

    /// Drop the last character. A single character or a signed single digit
    /// collapses back to `"0"`.
    pub fn truncate_last(&mut self) {
        let len = self.text.chars().count();
        if len <= 1 || (len == 2 && self.text.starts_with('-')) {
            self.clear();
        } else {
            self.text.pop();
        }
    }

    /// The numeric value of the buffer.
    ///
    /// A lone `-` reads as zero and a trailing `.` as `.0`.
    pub fn value(&self) -> Result<BigDecimal, CalcError> {
        if self.text == "-" {
            return Ok(BigDecimal::zero());
        }
        if self.text.ends_with('.') {
            return decimal::parse(&format!("{}0", self.text));
        }
        decimal::parse(&self.text)
    }
}
