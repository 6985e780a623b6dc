//! Checked 256-bit intermediate arithmetic
//!
//! Products of two u128 values are carried in `ethnum::U256` and narrowed
//! back with an explicit error when the result does not fit.

use ethnum::U256;

use crate::constants::Q64_RESOLUTION;
use crate::errors::{MathError, MathResult};

// ============================================================================
// Widening and Narrowing
// ============================================================================

#[inline]
pub fn mul_u256(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

pub fn u256_to_u128(value: U256) -> MathResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::NumberDownCastError);
    }
    Ok(value.as_u128())
}

pub fn u256_to_u64(value: U256) -> MathResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(MathError::NumberDownCastError);
    }
    Ok(value.as_u64())
}

/// Shift left by 64 bits, failing instead of discarding high bits.
pub fn checked_shl_64(value: U256) -> MathResult<U256> {
    if value.leading_zeros() < Q64_RESOLUTION {
        return Err(MathError::MultiplicationOverflow);
    }
    Ok(value << Q64_RESOLUTION)
}

// ============================================================================
// Multiply-Divide
// ============================================================================

/// floor(n0 * n1 / d)
pub fn checked_mul_div(n0: u128, n1: u128, d: u128) -> MathResult<u128> {
    checked_mul_div_round_up_if(n0, n1, d, false)
}

/// ceil(n0 * n1 / d)
pub fn checked_mul_div_round_up(n0: u128, n1: u128, d: u128) -> MathResult<u128> {
    checked_mul_div_round_up_if(n0, n1, d, true)
}

pub fn checked_mul_div_round_up_if(
    n0: u128,
    n1: u128,
    d: u128,
    round_up: bool,
) -> MathResult<u128> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }

    let product = mul_u256(n0, n1);
    let quotient = div_round_up_if_u256(product, U256::from(d), round_up)?;
    u256_to_u128(quotient).map_err(|_| MathError::MultiplicationOverflow)
}

/// (n0 * n1) >> 64, narrowed to u64.
pub fn checked_mul_shift_right(n0: u128, n1: u128) -> MathResult<u64> {
    checked_mul_shift_right_round_up_if(n0, n1, false)
}

pub fn checked_mul_shift_right_round_up_if(
    n0: u128,
    n1: u128,
    round_up: bool,
) -> MathResult<u64> {
    if n0 == 0 || n1 == 0 {
        return Ok(0);
    }

    let product = mul_u256(n0, n1);
    let mut shifted = product >> Q64_RESOLUTION;
    if round_up && (product & U256::from(u64::MAX)) != U256::ZERO {
        shifted += U256::ONE;
    }

    u256_to_u64(shifted).map_err(|_| MathError::MultiplicationShiftRightOverflow)
}

// ============================================================================
// Division
// ============================================================================

pub fn div_round_up(n: u128, d: u128) -> MathResult<u128> {
    div_round_up_if(n, d, true)
}

pub fn div_round_up_if(n: u128, d: u128, round_up: bool) -> MathResult<u128> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }

    let quotient = n / d;
    if round_up && n % d > 0 {
        // quotient < n when d > 1, and n % d == 0 when d == 1
        return Ok(quotient + 1);
    }
    Ok(quotient)
}

pub fn div_round_up_if_u256(n: U256, d: U256, round_up: bool) -> MathResult<U256> {
    if d == U256::ZERO {
        return Err(MathError::DivideByZero);
    }

    let quotient = n / d;
    if round_up && n % d != U256::ZERO {
        return Ok(quotient + U256::ONE);
    }
    Ok(quotient)
}
