//! Liquidity changes on a position and everything they touch

use yeveswap_math::{
    add_liquidity_delta, get_amount_delta_a, get_amount_delta_b, sqrt_price_from_tick_index,
};

use crate::constants::NUM_REWARDS;
use crate::error::{CoreResult, YeveswapError};
use crate::logic::position::next_position_modify_liquidity_update;
use crate::logic::reward::next_pool_reward_infos;
use crate::logic::tick::{next_growths_inside, next_tick_modify_liquidity_update};
use crate::state::{growth_globals_with_rewards, Pool, Position, RewardInfo, Tick};

/// Next state of every account a liquidity change touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyLiquidityUpdate {
    pub pool_liquidity: u128,
    pub tick_lower_update: Tick,
    pub tick_upper_update: Tick,
    pub reward_infos: [RewardInfo; NUM_REWARDS],
    pub position_update: Position,
}

/// Compute the effect of `liquidity_delta` on the pool, both boundary ticks and
/// the position, with rewards first advanced to `timestamp`.
///
/// A zero delta re-syncs owed fees and rewards, which is only meaningful for a
/// position that holds liquidity.
pub fn calculate_modify_liquidity(
    pool: &Pool,
    position: &Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    liquidity_delta: i128,
    timestamp: u64,
) -> CoreResult<ModifyLiquidityUpdate> {
    if liquidity_delta == 0 && position.liquidity == 0 {
        return Err(YeveswapError::LiquidityZero);
    }

    let reward_infos = next_pool_reward_infos(pool, timestamp)?;
    let globals = growth_globals_with_rewards(
        pool.fee_growth_global_a,
        pool.fee_growth_global_b,
        &reward_infos,
    );

    let pool_liquidity = next_pool_liquidity(pool, position, liquidity_delta)?;

    let tick_lower_update = next_tick_modify_liquidity_update(
        tick_lower,
        position.tick_lower_index,
        pool.tick_current_index,
        &globals,
        liquidity_delta,
        false,
    )?;
    let tick_upper_update = next_tick_modify_liquidity_update(
        tick_upper,
        position.tick_upper_index,
        pool.tick_current_index,
        &globals,
        liquidity_delta,
        true,
    )?;

    // Measured on the ticks as they were, since a full withdrawal resets them
    let growth_inside = next_growths_inside(
        pool.tick_current_index,
        tick_lower,
        position.tick_lower_index,
        tick_upper,
        position.tick_upper_index,
        &globals,
    );

    let position_update =
        next_position_modify_liquidity_update(position, liquidity_delta, &growth_inside)?;

    Ok(ModifyLiquidityUpdate {
        pool_liquidity,
        tick_lower_update,
        tick_upper_update,
        reward_infos,
        position_update,
    })
}

/// Active liquidity changes only when the range contains the current tick.
pub fn next_pool_liquidity(
    pool: &Pool,
    position: &Position,
    liquidity_delta: i128,
) -> CoreResult<u128> {
    if pool.tick_current_index < position.tick_upper_index
        && pool.tick_current_index >= position.tick_lower_index
    {
        Ok(add_liquidity_delta(pool.liquidity, liquidity_delta)?)
    } else {
        Ok(pool.liquidity)
    }
}

/// Token amounts moved by `liquidity_delta` over the position's range at the
/// pool's current price. Deposits round up, withdrawals round down.
pub fn calculate_liquidity_token_deltas(
    tick_current_index: i32,
    sqrt_price: u128,
    position: &Position,
    liquidity_delta: i128,
) -> CoreResult<(u64, u64)> {
    if liquidity_delta == 0 {
        return Err(YeveswapError::LiquidityZero);
    }

    let round_up = liquidity_delta > 0;
    let liquidity = liquidity_delta.unsigned_abs();

    let lower_price = sqrt_price_from_tick_index(position.tick_lower_index)?;
    let upper_price = sqrt_price_from_tick_index(position.tick_upper_index)?;

    let mut delta_a = 0;
    let mut delta_b = 0;
    if tick_current_index < position.tick_lower_index {
        // Range entirely above the price: only token A
        delta_a = get_amount_delta_a(lower_price, upper_price, liquidity, round_up)?;
    } else if tick_current_index < position.tick_upper_index {
        delta_a = get_amount_delta_a(sqrt_price, upper_price, liquidity, round_up)?;
        delta_b = get_amount_delta_b(lower_price, sqrt_price, liquidity, round_up)?;
    } else {
        // Range entirely below the price: only token B
        delta_b = get_amount_delta_b(lower_price, upper_price, liquidity, round_up)?;
    }

    Ok((delta_a, delta_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::state::{Address, PoolInit};

    fn pool(tick_current_sqrt_price: u128) -> Pool {
        Pool::new(PoolInit {
            config: Address::new_unique(),
            tick_spacing: 128,
            fee_rate: 3_000,
            protocol_fee_rate: 0,
            sqrt_price: tick_current_sqrt_price,
            token_mint_a: Address::new_unique(),
            token_vault_a: Address::new_unique(),
            token_mint_b: Address::new_unique(),
            token_vault_b: Address::new_unique(),
            reward_authority: Address::new_unique(),
        })
        .unwrap()
    }

    fn position(pool: &Pool, lower: i32, upper: i32) -> Position {
        Position::open(Address::new_unique(), pool, Address::new_unique(), lower, upper).unwrap()
    }

    #[test]
    fn test_zero_delta_on_empty_position_rejected() {
        let pool = pool(Q64);
        let position = position(&pool, -1280, 1280);
        assert_eq!(
            calculate_modify_liquidity(
                &pool,
                &position,
                &Tick::default(),
                &Tick::default(),
                0,
                0
            ),
            Err(YeveswapError::LiquidityZero)
        );
    }

    #[test]
    fn test_in_range_increase_updates_everything() {
        let pool = pool(Q64);
        let position = position(&pool, -1280, 1280);
        let update = calculate_modify_liquidity(
            &pool,
            &position,
            &Tick::default(),
            &Tick::default(),
            100_000_000_000,
            0,
        )
        .unwrap();

        assert_eq!(update.pool_liquidity, 100_000_000_000);
        assert_eq!(update.tick_lower_update.liquidity_net, 100_000_000_000);
        assert_eq!(update.tick_upper_update.liquidity_net, -100_000_000_000);
        assert_eq!(update.position_update.liquidity, 100_000_000_000);
    }

    #[test]
    fn test_out_of_range_increase_keeps_pool_liquidity() {
        let pool = pool(Q64);
        let position = position(&pool, 128, 1280);
        let update = calculate_modify_liquidity(
            &pool,
            &position,
            &Tick::default(),
            &Tick::default(),
            1_000,
            0,
        )
        .unwrap();
        assert_eq!(update.pool_liquidity, 0);
        assert_eq!(update.position_update.liquidity, 1_000);
    }

    #[test]
    fn test_token_deltas_by_price_position() {
        let pool = pool(Q64);

        let above = position(&pool, 128, 1280);
        let (a, b) = calculate_liquidity_token_deltas(0, Q64, &above, 1_000_000).unwrap();
        assert!(a > 0);
        assert_eq!(b, 0);

        let below = position(&pool, -1280, -128);
        let (a, b) = calculate_liquidity_token_deltas(0, Q64, &below, 1_000_000).unwrap();
        assert_eq!(a, 0);
        assert!(b > 0);

        let straddle = position(&pool, -1280, 1280);
        let (a, b) = calculate_liquidity_token_deltas(0, Q64, &straddle, 1_000_000).unwrap();
        assert!(a > 0 && b > 0);
    }

    #[test]
    fn test_deposit_rounds_up_withdraw_rounds_down() {
        let pool = pool(Q64);
        let straddle = position(&pool, -1280, 1280);
        let (in_a, in_b) = calculate_liquidity_token_deltas(0, Q64, &straddle, 1_234_567).unwrap();
        let (out_a, out_b) =
            calculate_liquidity_token_deltas(0, Q64, &straddle, -1_234_567).unwrap();
        assert!(in_a >= out_a && in_a - out_a <= 1);
        assert!(in_b >= out_b && in_b - out_b <= 1);
    }
}
