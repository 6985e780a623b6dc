use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::NUM_REWARDS;
use crate::error::{CoreResult, YeveswapError};
use crate::state::{Address, Persisted, Pool, Tick};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionRewardInfo {
    /// Reward growth inside the range at last sync, Q64.64
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

impl PositionRewardInfo {
    pub const LEN: usize = 16 + 8;
}

/// A liquidity provider's claim on `[tick_lower_index, tick_upper_index)` of one pool.
///
/// Keyed by its receipt mint; whoever holds the receipt controls the position.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub pool: Address,
    pub position_mint: Address,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,

    // Q64.64
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    // Q64.64
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,

    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

impl Position {
    // pool(32) + position_mint(32) + liquidity(16) + tick_lower_index(4) + tick_upper_index(4)
    // + fee_growth_checkpoint_a(16) + fee_owed_a(8) + fee_growth_checkpoint_b(16) + fee_owed_b(8)
    // + reward_infos(24*3)
    pub const LEN: usize =
        32 + 32 + 16 + 4 + 4 + 16 + 8 + 16 + 8 + PositionRewardInfo::LEN * NUM_REWARDS;

    /// Validate the range against the pool and build an empty position.
    pub fn open(
        pool_address: Address,
        pool: &Pool,
        position_mint: Address,
        tick_lower_index: i32,
        tick_upper_index: i32,
    ) -> CoreResult<Self> {
        Tick::check_is_usable_tick(tick_lower_index, pool.tick_spacing)?;
        Tick::check_is_usable_tick(tick_upper_index, pool.tick_spacing)?;
        if tick_lower_index >= tick_upper_index {
            return Err(YeveswapError::InvalidTickIndex(tick_lower_index));
        }

        Ok(Self {
            pool: pool_address,
            position_mint,
            tick_lower_index,
            tick_upper_index,
            ..Default::default()
        })
    }

    pub fn is_position_empty(&self) -> bool {
        let fees_not_owed = self.fee_owed_a == 0 && self.fee_owed_b == 0;
        let rewards_not_owed = self.reward_infos.iter().all(|info| info.amount_owed == 0);
        self.liquidity == 0 && fees_not_owed && rewards_not_owed
    }

    pub fn reset_fees_owed(&mut self) {
        self.fee_owed_a = 0;
        self.fee_owed_b = 0;
    }

    pub fn reset_reward_owed(&mut self, index: usize) -> CoreResult<u64> {
        let info = self
            .reward_infos
            .get_mut(index)
            .ok_or(YeveswapError::InvalidRewardIndex(index))?;
        Ok(std::mem::take(&mut info.amount_owed))
    }
}

impl Persisted for Position {
    const LEN: usize = Position::LEN;
}
