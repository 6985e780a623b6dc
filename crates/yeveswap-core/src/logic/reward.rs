use yeveswap_math::reward_growth_delta_x64;

use crate::constants::NUM_REWARDS;
use crate::error::{CoreResult, YeveswapError};
use crate::state::{Pool, RewardInfo};

/// Reward slots advanced to `next_timestamp`.
///
/// Each initialized slot gains `elapsed * emissions_per_second / liquidity`.
/// Nothing accrues while the pool has no active liquidity or when time has not
/// moved. The caller supplies the timestamp; it may never go backwards.
pub fn next_pool_reward_infos(
    pool: &Pool,
    next_timestamp: u64,
) -> CoreResult<[RewardInfo; NUM_REWARDS]> {
    let last_updated = pool.reward_last_updated_timestamp;
    if next_timestamp < last_updated {
        return Err(YeveswapError::InvalidTimestamp {
            timestamp: next_timestamp,
            last_updated,
        });
    }

    if pool.liquidity == 0 || next_timestamp == last_updated {
        return Ok(pool.reward_infos);
    }

    let time_delta = next_timestamp - last_updated;
    let mut next_reward_infos = pool.reward_infos;
    for reward_info in next_reward_infos.iter_mut().filter(|info| info.initialized()) {
        let growth_delta = reward_growth_delta_x64(
            time_delta,
            reward_info.emissions_per_second_x64,
            pool.liquidity,
        )?;
        // Accumulator wraps; only differences are ever consumed
        reward_info.growth_global_x64 = reward_info.growth_global_x64.wrapping_add(growth_delta);
    }

    Ok(next_reward_infos)
}
