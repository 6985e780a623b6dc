//! Q64.64 conversions for display and client-side price input
//!
//! On-ledger arithmetic never touches floats; these helpers exist for callers
//! that start from a human-readable price.

use fixed::types::U64F64;

use crate::errors::{MathError, MathResult};
use crate::tick_math::is_sqrt_price_in_bounds;

// ============================================================================
// Raw Q64.64
// ============================================================================

pub fn q64_to_f64(value_x64: u128) -> f64 {
    U64F64::from_bits(value_x64).to_num::<f64>()
}

pub fn f64_to_q64(value: f64) -> MathResult<u128> {
    if !value.is_finite() || value < 0.0 {
        return Err(MathError::InvalidPriceInput);
    }
    U64F64::checked_from_num(value)
        .map(U64F64::to_bits)
        .ok_or(MathError::InvalidPriceInput)
}

// ============================================================================
// Prices
// ============================================================================

/// Price of token A in token B, adjusted for mint decimals.
pub fn sqrt_price_x64_to_price(sqrt_price_x64: u128, decimals_a: u8, decimals_b: u8) -> f64 {
    let sqrt_price = q64_to_f64(sqrt_price_x64);
    let decimal_shift = i32::from(decimals_a) - i32::from(decimals_b);
    sqrt_price * sqrt_price * 10f64.powi(decimal_shift)
}

pub fn price_to_sqrt_price_x64(price: f64, decimals_a: u8, decimals_b: u8) -> MathResult<u128> {
    if !price.is_finite() || price <= 0.0 {
        return Err(MathError::InvalidPriceInput);
    }
    let decimal_shift = i32::from(decimals_b) - i32::from(decimals_a);
    let raw_price = price * 10f64.powi(decimal_shift);
    let sqrt_price_x64 = f64_to_q64(raw_price.sqrt())?;
    if !is_sqrt_price_in_bounds(sqrt_price_x64) {
        return Err(MathError::SqrtPriceOutOfBounds);
    }
    Ok(sqrt_price_x64)
}
