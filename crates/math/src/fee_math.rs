//! # Fee and Reward Accrual Math
//!
//! Global growth accumulators are Q64.64 per unit of liquidity and are
//! allowed to wrap; everything derived from them for a position uses
//! wrapping differences and a checked multiply.

use crate::constants::{PROTOCOL_FEE_RATE_MUL_VALUE, Q64_RESOLUTION};
use crate::errors::{MathError, MathResult};
use crate::safe::{checked_mul_div, checked_mul_shift_right};

/// Split a swap fee into `(protocol_fee, liquidity_provider_fee)`.
pub fn split_protocol_fee(fee_amount: u64, protocol_fee_rate: u16) -> MathResult<(u64, u64)> {
    let protocol_fee = checked_mul_div(
        u128::from(fee_amount),
        u128::from(protocol_fee_rate),
        PROTOCOL_FEE_RATE_MUL_VALUE,
    )?;
    let protocol_fee = u64::try_from(protocol_fee).map_err(|_| MathError::NumberDownCastError)?;
    let lp_fee = fee_amount
        .checked_sub(protocol_fee)
        .ok_or(MathError::NumberDownCastError)?;
    Ok((protocol_fee, lp_fee))
}

/// Fee growth per unit of liquidity, `fee * 2^64 / liquidity`. Zero when no liquidity is active.
pub fn fee_growth_delta_x64(fee_amount: u64, liquidity: u128) -> u128 {
    if liquidity == 0 {
        return 0;
    }
    (u128::from(fee_amount) << Q64_RESOLUTION) / liquidity
}

/// Reward growth per unit of liquidity accrued over `time_delta` seconds.
pub fn reward_growth_delta_x64(
    time_delta: u64,
    emissions_per_second_x64: u128,
    liquidity: u128,
) -> MathResult<u128> {
    if liquidity == 0 || time_delta == 0 {
        return Ok(0);
    }
    checked_mul_div(u128::from(time_delta), emissions_per_second_x64, liquidity)
}

/// Whole tokens emitted over `window_secs` at a Q64.64 per-second rate.
pub fn emissions_over_window(window_secs: u64, emissions_per_second_x64: u128) -> MathResult<u64> {
    checked_mul_shift_right(u128::from(window_secs), emissions_per_second_x64)
}

/// Tokens owed for `liquidity` across a growth difference, `(delta * L) >> 64`.
pub fn accrued_amount(growth_delta_x64: u128, liquidity: u128) -> MathResult<u64> {
    checked_mul_shift_right(growth_delta_x64, liquidity)
}
