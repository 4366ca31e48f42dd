//! Conversions between API-facing decimal amounts and stored minor units.
//!
//! Balances and amounts are `i64` cents inside the crate. These functions are the only place
//! floating point touches money, and they are only called at the HTTP / chat boundary.

use crate::errors::{Error, Result};

/// Minor units in one major unit (cents per dollar)
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Converts a decimal major-unit amount into minor units, rounding to the nearest cent.
///
/// Rejects NaN, infinities, negative values and anything that does not fit in an `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_minor_units(amount: f64) -> Result<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: amount.to_string(),
        });
    }

    let scaled = (amount * MINOR_UNITS_PER_MAJOR as f64).round();
    if scaled >= i64::MAX as f64 {
        return Err(Error::InvalidAmount {
            amount: amount.to_string(),
        });
    }
    Ok(scaled as i64)
}

/// Converts minor units to a major-unit float for JSON responses.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// Renders minor units as a fixed two-decimal string, e.g. `-12.05`.
#[must_use]
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
    format!("{sign}{}.{:02}", abs / per_major, abs % per_major)
}

/// Fails with `InvalidAmount` unless `amount` is strictly positive.
pub(crate) fn ensure_positive(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: format_minor_units(amount),
        });
    }
    Ok(())
}
