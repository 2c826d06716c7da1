//! Human-readable decimal amount conversion.
//!
//! Users deal in decimal units ("10.5 SOL"); the ledger deals in integer
//! base units (lamports, token base units). Conversion goes through
//! [`rust_decimal::Decimal`] so `0.1`-style values never pick up binary
//! floating point error, and rounds half-away-from-zero to the nearest
//! base unit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::PayError;

/// Parses a user-supplied decimal amount, rejecting non-numeric and
/// non-positive values.
///
/// # Errors
///
/// Returns [`PayError::InvalidAmount`] if the string is not a decimal
/// number or is ≤ 0.
pub fn parse_amount(input: &str) -> Result<Decimal, PayError> {
    let amount = Decimal::from_str(input.trim())
        .map_err(|_| PayError::InvalidAmount(format!("not a decimal number: {input:?}")))?;
    if amount <= Decimal::ZERO {
        return Err(PayError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(amount)
}

/// Converts a decimal amount into integer base units at the given
/// precision, rounded to the nearest unit.
///
/// # Errors
///
/// Returns [`PayError::InvalidAmount`] if the amount is ≤ 0, rounds to
/// zero base units, or overflows `u64`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, PayError> {
    if amount <= Decimal::ZERO {
        return Err(PayError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .map(Decimal::from)
        .ok_or_else(|| {
            PayError::InvalidAmount(format!("unsupported decimal precision: {decimals}"))
        })?;
    let scaled = amount
        .checked_mul(scale)
        .ok_or_else(|| PayError::InvalidAmount(format!("amount out of range: {amount}")))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let units = scaled
        .to_u64()
        .ok_or_else(|| PayError::InvalidAmount(format!("amount out of range: {amount}")))?;
    if units == 0 {
        return Err(PayError::InvalidAmount(format!(
            "{amount} rounds to zero base units at {decimals} decimals"
        )));
    }
    Ok(units)
}

/// Converts integer base units back to a decimal amount. Lossless.
#[must_use]
pub fn from_base_units(units: u64, decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(units), u32::from(decimals)).normalize()
}
