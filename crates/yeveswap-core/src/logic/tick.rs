//! Tick liquidity and outside-growth transitions
//!
//! "Outside" growth of a tick is the growth accrued on the side of the tick
//! opposite the current price. These functions are pure: they take a tick by
//! reference and return its next value.

use yeveswap_math::add_liquidity_delta;

use crate::constants::NUM_REWARDS;
use crate::error::{CoreResult, YeveswapError};
use crate::state::{GrowthSnapshot, Tick};

/// Re-express a tick's outside growth relative to the other side:
/// `outside = global - outside` for every accumulator, wrapping.
pub fn flip_outside_growth(tick: &Tick, globals: &GrowthSnapshot) -> Tick {
    let outside = tick.outside_growth();
    let mut rewards = [0u128; NUM_REWARDS];
    for (i, growth) in rewards.iter_mut().enumerate() {
        *growth = globals.rewards[i].wrapping_sub(outside.rewards[i]);
    }

    let mut next = *tick;
    next.set_outside_growth(&GrowthSnapshot {
        fee_a: globals.fee_a.wrapping_sub(outside.fee_a),
        fee_b: globals.fee_b.wrapping_sub(outside.fee_b),
        rewards,
    });
    next
}

/// Tick state after the price crosses it. Uninitialized ticks are not flipped.
pub fn next_tick_cross_update(tick: &Tick, globals: &GrowthSnapshot) -> Tick {
    if !tick.initialized {
        return *tick;
    }
    flip_outside_growth(tick, globals)
}

/// Liquidity change applied to active liquidity when crossing `tick`.
///
/// Moving up through a tick adds its net liquidity; moving down subtracts it.
pub fn crossing_liquidity_delta(tick: &Tick, a_to_b: bool) -> CoreResult<i128> {
    if a_to_b {
        tick.liquidity_net
            .checked_neg()
            .ok_or(YeveswapError::LiquidityNetError)
    } else {
        Ok(tick.liquidity_net)
    }
}

/// Tick state after a position bounded by it changes liquidity by `liquidity_delta`.
///
/// A tick touched for the first time records the global growth as outside when
/// the current price is at or above it, and zero otherwise. A tick whose gross
/// liquidity returns to zero is reset.
pub fn next_tick_modify_liquidity_update(
    tick: &Tick,
    tick_index: i32,
    tick_current_index: i32,
    globals: &GrowthSnapshot,
    liquidity_delta: i128,
    is_upper_tick: bool,
) -> CoreResult<Tick> {
    if liquidity_delta == 0 {
        return Ok(*tick);
    }

    let liquidity_gross = add_liquidity_delta(tick.liquidity_gross, liquidity_delta)?;
    if liquidity_gross == 0 {
        return Ok(Tick::default());
    }

    let outside = if tick.liquidity_gross == 0 {
        if tick_current_index >= tick_index {
            *globals
        } else {
            GrowthSnapshot::default()
        }
    } else {
        tick.outside_growth()
    };

    // Upper bounds remove liquidity when crossed upward
    let liquidity_net = if is_upper_tick {
        tick.liquidity_net.checked_sub(liquidity_delta)
    } else {
        tick.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(YeveswapError::LiquidityNetError)?;

    let mut next = Tick {
        initialized: true,
        liquidity_net,
        liquidity_gross,
        ..Default::default()
    };
    next.set_outside_growth(&outside);
    Ok(next)
}

/// Growth accrued inside `[tick_lower_index, tick_upper_index)`.
///
/// An uninitialized lower tick counts all global growth as below it; an
/// uninitialized upper tick counts nothing as above it.
pub fn next_growths_inside(
    tick_current_index: i32,
    tick_lower: &Tick,
    tick_lower_index: i32,
    tick_upper: &Tick,
    tick_upper_index: i32,
    globals: &GrowthSnapshot,
) -> GrowthSnapshot {
    let inside = |global: u128, lower_outside: u128, upper_outside: u128| -> u128 {
        let below = if !tick_lower.initialized {
            global
        } else if tick_current_index < tick_lower_index {
            global.wrapping_sub(lower_outside)
        } else {
            lower_outside
        };

        let above = if !tick_upper.initialized {
            0
        } else if tick_current_index < tick_upper_index {
            upper_outside
        } else {
            global.wrapping_sub(upper_outside)
        };

        global.wrapping_sub(below).wrapping_sub(above)
    };

    let mut rewards = [0u128; NUM_REWARDS];
    for (i, growth) in rewards.iter_mut().enumerate() {
        *growth = inside(
            globals.rewards[i],
            tick_lower.reward_growths_outside[i],
            tick_upper.reward_growths_outside[i],
        );
    }

    GrowthSnapshot {
        fee_a: inside(
            globals.fee_a,
            tick_lower.fee_growth_outside_a,
            tick_upper.fee_growth_outside_a,
        ),
        fee_b: inside(
            globals.fee_b,
            tick_lower.fee_growth_outside_b,
            tick_upper.fee_growth_outside_b,
        ),
        rewards,
    }
}
