//! Swap execution across initialized ticks
//!
//! The loop walks the price from tick to tick, charging fees per step and
//! crossing initialized ticks on the way. It works on a [`SwapTickSequence`]
//! of copied pages and returns the pool's next state; nothing is committed here.

use tracing::trace;
use yeveswap_math::{
    add_liquidity_delta, compute_swap, fee_growth_delta_x64, split_protocol_fee, sqrt_price_from_tick_index,
    tick_index_from_sqrt_price, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, MIN_TICK_INDEX,
};

use crate::constants::NUM_REWARDS;
use crate::error::{CoreResult, YeveswapError};
use crate::logic::reward::next_pool_reward_infos;
use crate::logic::tick_sequence::SwapTickSequence;
use crate::state::{growth_globals_with_rewards, Pool, RewardInfo};

/// Pool state after a swap plus the token amounts it moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSwapUpdate {
    pub amount_a: u64,
    pub amount_b: u64,
    pub next_liquidity: u128,
    pub next_tick_index: i32,
    pub next_sqrt_price: u128,
    /// Fee growth of the input token
    pub next_fee_growth_global: u128,
    pub next_reward_infos: [RewardInfo; NUM_REWARDS],
    pub next_protocol_fee: u64,
}

impl PostSwapUpdate {
    /// `(input, output)` amounts for the given direction.
    pub fn input_output(&self, a_to_b: bool) -> (u64, u64) {
        if a_to_b {
            (self.amount_a, self.amount_b)
        } else {
            (self.amount_b, self.amount_a)
        }
    }
}

/// Swap `amount` of the specified token against `pool`.
///
/// A `sqrt_price_limit` of zero means no limit: the swap may run to the edge of
/// the price range. An exact-output swap without a limit must fill completely.
pub fn swap(
    pool: &Pool,
    tick_sequence: &mut SwapTickSequence,
    amount: u64,
    sqrt_price_limit: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
    timestamp: u64,
) -> CoreResult<PostSwapUpdate> {
    let adjusted_sqrt_price_limit = if sqrt_price_limit == 0 {
        if a_to_b {
            MIN_SQRT_PRICE_X64
        } else {
            MAX_SQRT_PRICE_X64
        }
    } else {
        sqrt_price_limit
    };

    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&adjusted_sqrt_price_limit) {
        return Err(YeveswapError::SqrtPriceOutOfBounds);
    }
    if (a_to_b && adjusted_sqrt_price_limit > pool.sqrt_price)
        || (!a_to_b && adjusted_sqrt_price_limit < pool.sqrt_price)
    {
        return Err(YeveswapError::InvalidSqrtPriceLimitDirection);
    }
    if amount == 0 {
        return Err(YeveswapError::ZeroTradableAmount);
    }

    let next_reward_infos = next_pool_reward_infos(pool, timestamp)?;

    let mut amount_remaining = amount;
    let mut amount_calculated: u64 = 0;
    let mut curr_sqrt_price = pool.sqrt_price;
    let mut curr_tick_index = pool.tick_current_index;
    let mut curr_liquidity = pool.liquidity;
    let mut curr_protocol_fee: u64 = 0;
    let mut curr_fee_growth_global_input = if a_to_b {
        pool.fee_growth_global_a
    } else {
        pool.fee_growth_global_b
    };

    while amount_remaining > 0 && adjusted_sqrt_price_limit != curr_sqrt_price {
        let next = tick_sequence.get_next_initialized_tick_index(curr_tick_index)?;
        let next_tick_sqrt_price = sqrt_price_from_tick_index(next.tick_index)?;

        let sqrt_price_target = if a_to_b {
            next_tick_sqrt_price.max(adjusted_sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(adjusted_sqrt_price_limit)
        };

        let step = compute_swap(
            amount_remaining,
            pool.fee_rate,
            curr_liquidity,
            curr_sqrt_price,
            sqrt_price_target,
            amount_specified_is_input,
            a_to_b,
        )?;

        if amount_specified_is_input {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_in)
                .and_then(|remaining| remaining.checked_sub(step.fee_amount))
                .ok_or(YeveswapError::AmountRemainingOverflow)?;
            amount_calculated = amount_calculated
                .checked_add(step.amount_out)
                .ok_or(YeveswapError::AmountCalcOverflow)?;
        } else {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(YeveswapError::AmountRemainingOverflow)?;
            amount_calculated = amount_calculated
                .checked_add(step.amount_in)
                .and_then(|calculated| calculated.checked_add(step.fee_amount))
                .ok_or(YeveswapError::AmountCalcOverflow)?;
        }

        let (protocol_fee, lp_fee) = split_protocol_fee(step.fee_amount, pool.protocol_fee_rate)?;
        curr_protocol_fee = curr_protocol_fee
            .checked_add(protocol_fee)
            .ok_or(YeveswapError::ProtocolFeeOverflow)?;
        curr_fee_growth_global_input = curr_fee_growth_global_input
            .wrapping_add(fee_growth_delta_x64(lp_fee, curr_liquidity));

        if step.next_price == next_tick_sqrt_price {
            if let Some(array_index) = next.array_index {
                let (fee_growth_a, fee_growth_b) = if a_to_b {
                    (curr_fee_growth_global_input, pool.fee_growth_global_b)
                } else {
                    (pool.fee_growth_global_a, curr_fee_growth_global_input)
                };
                let globals =
                    growth_globals_with_rewards(fee_growth_a, fee_growth_b, &next_reward_infos);
                let liquidity_delta =
                    tick_sequence.cross_tick(array_index, next.tick_index, &globals)?;
                if liquidity_delta != 0 {
                    curr_liquidity = add_liquidity_delta(curr_liquidity, liquidity_delta)?;
                    trace!(
                        tick_index = next.tick_index,
                        liquidity_delta,
                        liquidity = curr_liquidity,
                        "crossed tick"
                    );
                }
            }

            curr_tick_index = if a_to_b {
                (next.tick_index - 1).max(MIN_TICK_INDEX)
            } else {
                next.tick_index
            };
        } else if step.next_price != curr_sqrt_price {
            curr_tick_index = tick_index_from_sqrt_price(step.next_price)?;
        }

        curr_sqrt_price = step.next_price;
    }

    if !amount_specified_is_input && sqrt_price_limit == 0 && amount_remaining != 0 {
        return Err(YeveswapError::PartialFillError);
    }

    let amount_filled = amount - amount_remaining;
    let (amount_a, amount_b) = if a_to_b == amount_specified_is_input {
        (amount_filled, amount_calculated)
    } else {
        (amount_calculated, amount_filled)
    };

    Ok(PostSwapUpdate {
        amount_a,
        amount_b,
        next_liquidity: curr_liquidity,
        next_tick_index: curr_tick_index,
        next_sqrt_price: curr_sqrt_price,
        next_fee_growth_global: curr_fee_growth_global_input,
        next_reward_infos,
        next_protocol_fee: curr_protocol_fee,
    })
}
