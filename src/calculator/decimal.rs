//! Fixed-precision decimal arithmetic.
//!
//! Every result the engine produces goes through [`round`], which keeps
//! [`WORKING_PRECISION`] significant digits with ties rounded away from zero.
//! Values are plain [`BigDecimal`]s; only the rounding context lives here.

use std::num::NonZeroU64;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use super::error::{ArithmeticError, CalcError};

/// Significant digits kept by every arithmetic result.
pub const WORKING_PRECISION: NonZeroU64 = match NonZeroU64::new(16) {
    Some(precision) => precision,
    None => panic!("working precision must be non-zero"),
};

/// Upper bound on Newton steps for [`sqrt`].
const MAX_SQRT_ITERATIONS: usize = 100;

/// Round to [`WORKING_PRECISION`] significant digits, half-up.
pub fn round(value: &BigDecimal) -> BigDecimal {
    value.with_precision_round(WORKING_PRECISION, RoundingMode::HalfUp)
}

pub fn add(left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
    round(&(left + right))
}

pub fn sub(left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
    round(&(left - right))
}

pub fn mul(left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
    round(&(left * right))
}

/// Divide at working precision.
///
/// The quotient is carried to at least one digit beyond the working
/// precision by integer division and then rounded once, so the result is
/// what an exact quotient rounded half-up would give.
pub fn div(left: &BigDecimal, right: &BigDecimal) -> Result<BigDecimal, ArithmeticError> {
    if right.is_zero() {
        return Err(ArithmeticError::DivideByZero);
    }
    if left.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let shift = (WORKING_PRECISION.get() + 2 + right.digits()).saturating_sub(left.digits());
    let (numerator, left_scale) = left.as_bigint_and_exponent();
    let (denominator, right_scale) = right.as_bigint_and_exponent();
    let quotient = (numerator * pow10(shift as usize)) / denominator;

    Ok(round(&BigDecimal::new(
        quotient,
        left_scale - right_scale + shift as i64,
    )))
}

/// Square root by Newton-Raphson refinement.
///
/// Seeded from the `f64` root of the value's mantissa and iterated until two
/// successive estimates are equal at working precision. Estimates can
/// oscillate in the last digit, so the loop is capped and the latest estimate
/// is returned when the cap hits.
pub fn sqrt(value: &BigDecimal) -> Result<BigDecimal, ArithmeticError> {
    if value.is_negative() {
        return Err(ArithmeticError::InvalidInput);
    }
    if value.is_zero() {
        return Ok(BigDecimal::zero());
    }
    newton_sqrt(value, sqrt_seed(value), MAX_SQRT_ITERATIONS)
}

fn newton_sqrt(
    value: &BigDecimal,
    mut guess: BigDecimal,
    max_iterations: usize,
) -> Result<BigDecimal, ArithmeticError> {
    let two = BigDecimal::from(2);

    for _ in 0..max_iterations {
        let next = div(&(&guess + &div(value, &guess)?), &two)?;
        if next == guess {
            return Ok(next);
        }
        guess = next;
    }

    tracing::warn!(
        value = %format(value),
        estimate = %format(&guess),
        "square root did not settle, using last estimate"
    );
    Ok(guess)
}

// Writes a positive value as m * 10^(2k) with 1 <= m < 100, so the f64 root
// of m is always finite and non-zero whatever the magnitude of the value.
fn sqrt_seed(value: &BigDecimal) -> BigDecimal {
    let (digits, scale) = value.as_bigint_and_exponent();
    let exponent = value.digits() as i64 - scale - 1;
    let half_exponent = exponent.div_euclid(2);

    let mantissa = round(&BigDecimal::new(digits, scale + 2 * half_exponent));
    let root = mantissa
        .to_f64()
        .map(f64::sqrt)
        .and_then(BigDecimal::from_f64)
        .unwrap_or_else(BigDecimal::one);

    let (root_digits, root_scale) = root.as_bigint_and_exponent();
    round(&BigDecimal::new(root_digits, root_scale - half_exponent))
}

/// Format a value as plain decimal text.
///
/// Trailing fractional zeros are removed and exponent notation is expanded,
/// so `3.00` becomes `3` and `1E+2` becomes `100`.
pub fn format(value: &BigDecimal) -> String {
    value.normalized().to_plain_string()
}

/// Parse plain decimal text such as `-12.5`.
pub fn parse(text: &str) -> Result<BigDecimal, CalcError> {
    BigDecimal::from_str(text).map_err(|_| CalcError::MalformedBuffer(text.to_string()))
}

fn pow10(exponent: usize) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exponent)
}
