use yeveswap_math::{accrued_amount, add_liquidity_delta};

use crate::error::{CoreResult, YeveswapError};
use crate::state::{GrowthSnapshot, Position};

/// Position after syncing owed fees and rewards to `growth_inside` and
/// applying `liquidity_delta`.
///
/// Owed amounts grow by `(inside - checkpoint) * liquidity >> 64` using the
/// position's liquidity before the delta. The subtraction wraps with the
/// accumulators; a product that does not fit in u64 is an error.
pub fn next_position_modify_liquidity_update(
    position: &Position,
    liquidity_delta: i128,
    growth_inside: &GrowthSnapshot,
) -> CoreResult<Position> {
    let mut next = *position;

    let fee_delta_a = growth_inside
        .fee_a
        .wrapping_sub(position.fee_growth_checkpoint_a);
    let fee_delta_b = growth_inside
        .fee_b
        .wrapping_sub(position.fee_growth_checkpoint_b);

    let fee_owed_delta_a = accrued_amount(fee_delta_a, position.liquidity)
        .map_err(|_| YeveswapError::FeeOwedOverflow)?;
    let fee_owed_delta_b = accrued_amount(fee_delta_b, position.liquidity)
        .map_err(|_| YeveswapError::FeeOwedOverflow)?;

    next.fee_growth_checkpoint_a = growth_inside.fee_a;
    next.fee_growth_checkpoint_b = growth_inside.fee_b;
    next.fee_owed_a = position
        .fee_owed_a
        .checked_add(fee_owed_delta_a)
        .ok_or(YeveswapError::FeeOwedOverflow)?;
    next.fee_owed_b = position
        .fee_owed_b
        .checked_add(fee_owed_delta_b)
        .ok_or(YeveswapError::FeeOwedOverflow)?;

    for (i, reward_info) in next.reward_infos.iter_mut().enumerate() {
        let growth_delta = growth_inside.rewards[i].wrapping_sub(reward_info.growth_inside_checkpoint);
        let owed_delta = accrued_amount(growth_delta, position.liquidity)
            .map_err(|_| YeveswapError::RewardOwedOverflow)?;

        reward_info.growth_inside_checkpoint = growth_inside.rewards[i];
        reward_info.amount_owed = reward_info
            .amount_owed
            .checked_add(owed_delta)
            .ok_or(YeveswapError::RewardOwedOverflow)?;
    }

    next.liquidity = add_liquidity_delta(position.liquidity, liquidity_delta)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use yeveswap_math::MathError;

    fn growth(fee_a: u128, fee_b: u128, reward: u128) -> GrowthSnapshot {
        GrowthSnapshot {
            fee_a,
            fee_b,
            rewards: [reward, 0, 0],
        }
    }

    #[test]
    fn test_accrues_with_previous_liquidity() {
        let position = Position {
            liquidity: 1_000,
            ..Default::default()
        };
        let next =
            next_position_modify_liquidity_update(&position, 500, &growth(2 * Q64, Q64, 3 * Q64))
                .unwrap();
        assert_eq!(next.fee_owed_a, 2_000);
        assert_eq!(next.fee_owed_b, 1_000);
        assert_eq!(next.reward_infos[0].amount_owed, 3_000);
        assert_eq!(next.fee_growth_checkpoint_a, 2 * Q64);
        assert_eq!(next.reward_infos[0].growth_inside_checkpoint, 3 * Q64);
        assert_eq!(next.liquidity, 1_500);
    }

    #[test]
    fn test_growth_delta_wraps() {
        let position = Position {
            liquidity: 10,
            fee_growth_checkpoint_a: u128::MAX - Q64 + 1,
            ..Default::default()
        };
        // Accumulator wrapped past zero since the checkpoint: one unit of growth
        let next = next_position_modify_liquidity_update(&position, 0, &growth(0, 0, 0)).unwrap();
        assert_eq!(next.fee_owed_a, 10);
        assert_eq!(next.fee_growth_checkpoint_a, 0);
    }

    #[test]
    fn test_owed_overflow_is_an_error() {
        let position = Position {
            liquidity: u128::MAX,
            ..Default::default()
        };
        assert_eq!(
            next_position_modify_liquidity_update(&position, 0, &growth(Q64, 0, 0)),
            Err(YeveswapError::FeeOwedOverflow)
        );
        assert_eq!(
            next_position_modify_liquidity_update(&position, 0, &growth(0, 0, Q64)),
            Err(YeveswapError::RewardOwedOverflow)
        );

        let position = Position {
            liquidity: 1,
            fee_owed_b: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            next_position_modify_liquidity_update(&position, 0, &growth(0, Q64, 0)),
            Err(YeveswapError::FeeOwedOverflow)
        );
    }

    #[test]
    fn test_liquidity_underflow() {
        let position = Position {
            liquidity: 10,
            ..Default::default()
        };
        assert_eq!(
            next_position_modify_liquidity_update(&position, -11, &GrowthSnapshot::default()),
            Err(YeveswapError::Math(MathError::LiquidityUnderflow))
        );
    }
}
