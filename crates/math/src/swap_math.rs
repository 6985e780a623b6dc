//! # Swap Step Math
//!
//! One step of a swap moves the price from `sqrt_price_current` toward
//! `sqrt_price_target` through constant liquidity, stopping early when the
//! remaining amount runs out.

use crate::constants::FEE_RATE_MUL_VALUE;
use crate::errors::{MathError, MathResult};
use crate::liquidity_math::{
    get_amount_delta_a, get_amount_delta_b, get_next_sqrt_price, try_get_amount_delta_a,
    try_get_amount_delta_b, AmountDeltaU64,
};
use crate::safe::{checked_mul_div, checked_mul_div_round_up};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapStepComputation {
    pub amount_in: u64,
    pub amount_out: u64,
    pub next_price: u128,
    pub fee_amount: u64,
}

pub fn compute_swap(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> MathResult<SwapStepComputation> {
    let fee_rate = u128::from(fee_rate);
    if fee_rate >= FEE_RATE_MUL_VALUE {
        return Err(MathError::MultiplicationOverflow);
    }

    // Amount of the specified token needed to reach the target
    let initial_amount_fixed_delta = try_get_amount_fixed_delta(
        sqrt_price_current,
        sqrt_price_target,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    let amount_calc = if amount_specified_is_input {
        let after_fee = checked_mul_div(
            u128::from(amount_remaining),
            FEE_RATE_MUL_VALUE - fee_rate,
            FEE_RATE_MUL_VALUE,
        )?;
        u64::try_from(after_fee).map_err(|_| MathError::NumberDownCastError)?
    } else {
        amount_remaining
    };

    let next_sqrt_price = if initial_amount_fixed_delta.lte(amount_calc) {
        sqrt_price_target
    } else {
        get_next_sqrt_price(
            sqrt_price_current,
            liquidity,
            amount_calc,
            amount_specified_is_input,
            a_to_b,
        )?
    };

    let is_max_swap = next_sqrt_price == sqrt_price_target;

    let amount_unfixed_delta = get_amount_unfixed_delta(
        sqrt_price_current,
        next_sqrt_price,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    // The initial delta is reusable only when the step reached the target and it fit in u64
    let amount_fixed_delta = if !is_max_swap || initial_amount_fixed_delta.exceeds_max() {
        get_amount_fixed_delta(
            sqrt_price_current,
            next_sqrt_price,
            liquidity,
            amount_specified_is_input,
            a_to_b,
        )?
    } else {
        initial_amount_fixed_delta.value()
    };

    let (amount_in, mut amount_out) = if amount_specified_is_input {
        (amount_fixed_delta, amount_unfixed_delta)
    } else {
        (amount_unfixed_delta, amount_fixed_delta)
    };

    if !amount_specified_is_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if amount_specified_is_input && !is_max_swap {
        // Everything not consumed by the price move is fee
        amount_remaining
            .checked_sub(amount_in)
            .ok_or(MathError::NumberDownCastError)?
    } else {
        let fee = checked_mul_div_round_up(
            u128::from(amount_in),
            fee_rate,
            FEE_RATE_MUL_VALUE - fee_rate,
        )?;
        u64::try_from(fee).map_err(|_| MathError::NumberDownCastError)?
    };

    Ok(SwapStepComputation {
        amount_in,
        amount_out,
        next_price: next_sqrt_price,
        fee_amount,
    })
}

/// Delta of the token whose amount was specified by the caller.
fn get_amount_fixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> MathResult<u64> {
    if a_to_b == amount_specified_is_input {
        get_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    } else {
        get_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    }
}

fn try_get_amount_fixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> MathResult<AmountDeltaU64> {
    if a_to_b == amount_specified_is_input {
        try_get_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    } else {
        try_get_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    }
}

/// Delta of the token computed from the price move.
fn get_amount_unfixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> MathResult<u64> {
    if a_to_b == amount_specified_is_input {
        get_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    } else {
        get_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    }
}
