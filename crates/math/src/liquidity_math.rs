//! # Liquidity Math
//!
//! Token amounts spanned by liquidity between two square-root prices, price
//! movement for a given token amount, and checked liquidity deltas.
//!
//! Rounding always favours the pool: amounts owed to the pool round up,
//! amounts paid out round down.

use ethnum::U256;

use crate::constants::Q64_RESOLUTION;
use crate::errors::{MathError, MathResult};
use crate::safe::{
    checked_mul_div, checked_shl_64, div_round_up_if, div_round_up_if_u256, mul_u256,
    u256_to_u128,
};
use crate::tick_math::is_sqrt_price_in_bounds;

/// A token delta that may not fit in u64.
///
/// Swap steps use this to fall back to the amount-limited path instead of
/// failing when the full distance to the target price is unaffordable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountDeltaU64 {
    Valid(u64),
    ExceedsMax(MathError),
}

impl AmountDeltaU64 {
    pub fn lte(self, other: u64) -> bool {
        match self {
            AmountDeltaU64::Valid(value) => value <= other,
            AmountDeltaU64::ExceedsMax(_) => false,
        }
    }

    pub fn exceeds_max(&self) -> bool {
        matches!(self, AmountDeltaU64::ExceedsMax(_))
    }

    pub fn value(self) -> u64 {
        match self {
            AmountDeltaU64::Valid(value) => value,
            AmountDeltaU64::ExceedsMax(_) => u64::MAX,
        }
    }

    pub fn into_result(self) -> MathResult<u64> {
        match self {
            AmountDeltaU64::Valid(value) => Ok(value),
            AmountDeltaU64::ExceedsMax(error) => Err(error),
        }
    }
}

// ============================================================================
// Liquidity Deltas
// ============================================================================

pub fn add_liquidity_delta(liquidity: u128, delta: i128) -> MathResult<u128> {
    if delta == 0 {
        return Ok(liquidity);
    }
    if delta > 0 {
        liquidity
            .checked_add(delta as u128)
            .ok_or(MathError::LiquidityOverflow)
    } else {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::LiquidityUnderflow)
    }
}

/// Signed liquidity delta for an unsigned amount.
pub fn convert_to_liquidity_delta(liquidity_amount: u128, positive: bool) -> MathResult<i128> {
    let magnitude = i128::try_from(liquidity_amount).map_err(|_| MathError::LiquidityTooHigh)?;
    Ok(if positive { magnitude } else { -magnitude })
}

// ============================================================================
// Token Amounts
// ============================================================================

fn ordered(sqrt_price_0: u128, sqrt_price_1: u128) -> (u128, u128) {
    if sqrt_price_0 > sqrt_price_1 {
        (sqrt_price_1, sqrt_price_0)
    } else {
        (sqrt_price_0, sqrt_price_1)
    }
}

/// Token A spanned by `liquidity` between two prices:
/// `L * (upper - lower) * 2^64 / (upper * lower)`.
pub fn get_amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<u64> {
    try_get_amount_delta_a(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.into_result()
}

pub fn try_get_amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<AmountDeltaU64> {
    let (sqrt_price_lower, sqrt_price_upper) = ordered(sqrt_price_0, sqrt_price_1);
    let sqrt_price_diff = sqrt_price_upper - sqrt_price_lower;

    let numerator = checked_shl_64(mul_u256(liquidity, sqrt_price_diff))?;
    let denominator = mul_u256(sqrt_price_upper, sqrt_price_lower);

    let quotient = div_round_up_if_u256(numerator, denominator, round_up)?;
    if quotient > U256::from(u64::MAX) {
        return Ok(AmountDeltaU64::ExceedsMax(MathError::TokenAmountOverflow));
    }
    Ok(AmountDeltaU64::Valid(quotient.as_u64()))
}

/// Token B spanned by `liquidity` between two prices: `L * (upper - lower) / 2^64`.
pub fn get_amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<u64> {
    try_get_amount_delta_b(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.into_result()
}

pub fn try_get_amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<AmountDeltaU64> {
    let (sqrt_price_lower, sqrt_price_upper) = ordered(sqrt_price_0, sqrt_price_1);
    let sqrt_price_diff = sqrt_price_upper - sqrt_price_lower;

    let product = mul_u256(liquidity, sqrt_price_diff);
    let mut result = product >> Q64_RESOLUTION;
    if round_up && (product & U256::from(u64::MAX)) != U256::ZERO {
        result += U256::ONE;
    }

    if result > U256::from(u64::MAX) {
        return Ok(AmountDeltaU64::ExceedsMax(MathError::TokenAmountOverflow));
    }
    Ok(AmountDeltaU64::Valid(result.as_u64()))
}

// ============================================================================
// Price Movement
// ============================================================================

/// Price reached after moving `amount` of the specified token through `liquidity`.
///
/// Exact-input A→B and exact-output B→A both move the price through token A;
/// the other two cases move it through token B.
pub fn get_next_sqrt_price(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> MathResult<u128> {
    if amount_specified_is_input == a_to_b {
        get_next_sqrt_price_from_a_round_up(sqrt_price, liquidity, amount, amount_specified_is_input)
    } else {
        get_next_sqrt_price_from_b_round_down(
            sqrt_price,
            liquidity,
            amount,
            amount_specified_is_input,
        )
    }
}

/// `L * P / (L ± amount * P)`, rounded up.
pub fn get_next_sqrt_price_from_a_round_up(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
) -> MathResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    let product = mul_u256(sqrt_price, u128::from(amount));
    let numerator = checked_shl_64(mul_u256(liquidity, sqrt_price))?;
    let liquidity_shift_left = U256::from(liquidity) << Q64_RESOLUTION;

    let denominator = if amount_specified_is_input {
        liquidity_shift_left + product
    } else {
        if liquidity_shift_left <= product {
            return Err(MathError::DivideByZero);
        }
        liquidity_shift_left - product
    };

    let price = u256_to_u128(div_round_up_if_u256(numerator, denominator, true)?)?;
    if !is_sqrt_price_in_bounds(price) {
        return Err(MathError::SqrtPriceOutOfBounds);
    }
    Ok(price)
}

/// `P ± amount / L`, rounded so the price moves no further than paid for.
pub fn get_next_sqrt_price_from_b_round_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
) -> MathResult<u128> {
    let amount_x64 = u128::from(amount) << Q64_RESOLUTION;
    let delta = div_round_up_if(amount_x64, liquidity, !amount_specified_is_input)?;

    let price = if amount_specified_is_input {
        sqrt_price
            .checked_add(delta)
            .ok_or(MathError::SqrtPriceOutOfBounds)?
    } else {
        sqrt_price
            .checked_sub(delta)
            .ok_or(MathError::SqrtPriceOutOfBounds)?
    };

    if !is_sqrt_price_in_bounds(price) {
        return Err(MathError::SqrtPriceOutOfBounds);
    }
    Ok(price)
}

// ============================================================================
// Liquidity From Amounts
// ============================================================================

/// Liquidity funded by `amount_a` across `[lower, upper]`, rounded down.
pub fn get_liquidity_from_amount_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    amount_a: u64,
) -> MathResult<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = ordered(sqrt_price_0, sqrt_price_1);
    let diff = sqrt_price_upper - sqrt_price_lower;
    // amount * lower * upper / diff / 2^64
    let scaled = checked_mul_div(u128::from(amount_a), sqrt_price_lower, diff)?;
    let product = mul_u256(scaled, sqrt_price_upper) >> Q64_RESOLUTION;
    u256_to_u128(product).map_err(|_| MathError::LiquidityOverflow)
}

/// Liquidity funded by `amount_b` across `[lower, upper]`, rounded down.
pub fn get_liquidity_from_amount_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    amount_b: u64,
) -> MathResult<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = ordered(sqrt_price_0, sqrt_price_1);
    let diff = sqrt_price_upper - sqrt_price_lower;
    checked_mul_div(u128::from(amount_b), 1u128 << Q64_RESOLUTION, diff)
}

/// Largest liquidity both token budgets can fund at the current price.
pub fn get_liquidity_for_amounts(
    sqrt_price_current: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    amount_a: u64,
    amount_b: u64,
) -> MathResult<u128> {
    if sqrt_price_current <= sqrt_price_lower {
        get_liquidity_from_amount_a(sqrt_price_lower, sqrt_price_upper, amount_a)
    } else if sqrt_price_current < sqrt_price_upper {
        let from_a = get_liquidity_from_amount_a(sqrt_price_current, sqrt_price_upper, amount_a)?;
        let from_b = get_liquidity_from_amount_b(sqrt_price_lower, sqrt_price_current, amount_b)?;
        Ok(from_a.min(from_b))
    } else {
        get_liquidity_from_amount_b(sqrt_price_lower, sqrt_price_upper, amount_b)
    }
}
