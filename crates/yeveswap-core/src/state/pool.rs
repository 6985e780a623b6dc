//! Pool state for one (config, mint A, mint B, tick spacing) pair

use borsh::{BorshDeserialize, BorshSerialize};
use yeveswap_math::{is_sqrt_price_in_bounds, tick_index_from_sqrt_price};

use crate::constants::{MAX_FEE_RATE, MAX_PROTOCOL_FEE_RATE, NUM_REWARDS};
use crate::error::{AuthorityRole, CoreResult, YeveswapError};
use crate::state::config::require_authority;
use crate::state::{Address, GrowthSnapshot, Persisted};

/// Identity of a pool: at most one pool exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolKey {
    pub config: Address,
    pub token_mint_a: Address,
    pub token_mint_b: Address,
    pub tick_spacing: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardInfo {
    /// Default address until the slot is initialized
    pub mint: Address,
    pub vault: Address,
    /// May set emissions and rotate itself
    pub authority: Address,
    /// Tokens emitted per second, Q64.64
    pub emissions_per_second_x64: u128,
    /// Reward tokens earned per unit of liquidity since the slot opened, Q64.64, wrapping
    pub growth_global_x64: u128,
}

impl RewardInfo {
    // mint(32) + vault(32) + authority(32) + emissions_per_second_x64(16) + growth_global_x64(16)
    pub const LEN: usize = 32 + 32 + 32 + 16 + 16;

    pub fn new(authority: Address) -> Self {
        Self {
            authority,
            ..Default::default()
        }
    }

    pub fn initialized(&self) -> bool {
        !self.mint.is_default()
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pool {
    pub config: Address,

    pub tick_spacing: u16,
    /// Hundredths of a basis point, at most MAX_FEE_RATE
    pub fee_rate: u16,
    /// Basis points of the fee, at most MAX_PROTOCOL_FEE_RATE
    pub protocol_fee_rate: u16,

    /// Active liquidity at the current price
    pub liquidity: u128,
    /// Q64.64
    pub sqrt_price: u128,
    pub tick_current_index: i32,

    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,

    pub token_mint_a: Address,
    pub token_vault_a: Address,
    pub fee_growth_global_a: u128,

    pub token_mint_b: Address,
    pub token_vault_b: Address,
    pub fee_growth_global_b: u128,

    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [RewardInfo; NUM_REWARDS],
}

// ============================================================================
// Construction
// ============================================================================

pub struct PoolInit {
    pub config: Address,
    pub tick_spacing: u16,
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub sqrt_price: u128,
    pub token_mint_a: Address,
    pub token_vault_a: Address,
    pub token_mint_b: Address,
    pub token_vault_b: Address,
    pub reward_authority: Address,
}

impl Pool {
    // config(32) + tick_spacing(2) + fee_rate(2) + protocol_fee_rate(2) + liquidity(16) + sqrt_price(16)
    // + tick_current_index(4) + protocol_fee_owed_a/b(8+8) + mint/vault/fee_growth A(32+32+16)
    // + mint/vault/fee_growth B(32+32+16) + reward_last_updated_timestamp(8) + reward_infos(128*3)
    pub const LEN: usize = 32
        + 2
        + 2
        + 2
        + 16
        + 16
        + 4
        + 8
        + 8
        + (32 + 32 + 16)
        + (32 + 32 + 16)
        + 8
        + RewardInfo::LEN * NUM_REWARDS;

    pub fn new(init: PoolInit) -> CoreResult<Self> {
        if init.token_mint_a == init.token_mint_b {
            return Err(YeveswapError::DuplicateTokenMints);
        }
        if init.token_mint_a > init.token_mint_b {
            return Err(YeveswapError::InvalidTokenMintOrder);
        }
        if init.tick_spacing == 0 {
            return Err(YeveswapError::InvalidTickSpacing);
        }
        if !is_sqrt_price_in_bounds(init.sqrt_price) {
            return Err(YeveswapError::SqrtPriceOutOfBounds);
        }

        let mut pool = Self {
            config: init.config,
            tick_spacing: init.tick_spacing,
            sqrt_price: init.sqrt_price,
            tick_current_index: tick_index_from_sqrt_price(init.sqrt_price)?,
            token_mint_a: init.token_mint_a,
            token_vault_a: init.token_vault_a,
            token_mint_b: init.token_mint_b,
            token_vault_b: init.token_vault_b,
            reward_infos: [RewardInfo::new(init.reward_authority); NUM_REWARDS],
            ..Default::default()
        };
        pool.update_fee_rate(init.fee_rate)?;
        pool.update_protocol_fee_rate(init.protocol_fee_rate)?;
        Ok(pool)
    }

    pub fn key(&self) -> PoolKey {
        PoolKey {
            config: self.config,
            token_mint_a: self.token_mint_a,
            token_mint_b: self.token_mint_b,
            tick_spacing: self.tick_spacing,
        }
    }

    // ========================================================================
    // Growth
    // ========================================================================

    /// Current global fee and reward growth.
    pub fn growth_globals(&self) -> GrowthSnapshot {
        growth_globals_with_rewards(
            self.fee_growth_global_a,
            self.fee_growth_global_b,
            &self.reward_infos,
        )
    }

    pub fn update_rewards(&mut self, reward_infos: [RewardInfo; NUM_REWARDS], timestamp: u64) {
        self.reward_infos = reward_infos;
        self.reward_last_updated_timestamp = timestamp;
    }

    pub fn update_rewards_and_liquidity(
        &mut self,
        reward_infos: [RewardInfo; NUM_REWARDS],
        liquidity: u128,
        timestamp: u64,
    ) {
        self.update_rewards(reward_infos, timestamp);
        self.liquidity = liquidity;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_after_swap(
        &mut self,
        liquidity: u128,
        tick_index: i32,
        sqrt_price: u128,
        fee_growth_global: u128,
        reward_infos: [RewardInfo; NUM_REWARDS],
        protocol_fee: u64,
        is_token_fee_in_a: bool,
        timestamp: u64,
    ) -> CoreResult<()> {
        self.tick_current_index = tick_index;
        self.sqrt_price = sqrt_price;
        self.liquidity = liquidity;
        self.update_rewards(reward_infos, timestamp);

        if is_token_fee_in_a {
            self.fee_growth_global_a = fee_growth_global;
            self.protocol_fee_owed_a = self
                .protocol_fee_owed_a
                .checked_add(protocol_fee)
                .ok_or(YeveswapError::ProtocolFeeOverflow)?;
        } else {
            self.fee_growth_global_b = fee_growth_global;
            self.protocol_fee_owed_b = self
                .protocol_fee_owed_b
                .checked_add(protocol_fee)
                .ok_or(YeveswapError::ProtocolFeeOverflow)?;
        }
        Ok(())
    }

    pub fn reset_protocol_fees_owed(&mut self) {
        self.protocol_fee_owed_a = 0;
        self.protocol_fee_owed_b = 0;
    }

    // ========================================================================
    // Fee Rates
    // ========================================================================

    pub fn update_fee_rate(&mut self, fee_rate: u16) -> CoreResult<()> {
        if fee_rate > MAX_FEE_RATE {
            return Err(YeveswapError::FeeRateMaxExceeded(fee_rate));
        }
        self.fee_rate = fee_rate;
        Ok(())
    }

    pub fn update_protocol_fee_rate(&mut self, protocol_fee_rate: u16) -> CoreResult<()> {
        if protocol_fee_rate > MAX_PROTOCOL_FEE_RATE {
            return Err(YeveswapError::ProtocolFeeRateMaxExceeded(protocol_fee_rate));
        }
        self.protocol_fee_rate = protocol_fee_rate;
        Ok(())
    }

    // ========================================================================
    // Reward Slots
    // ========================================================================

    /// Index of the lowest slot that has not been initialized.
    pub fn next_uninitialized_reward_index(&self) -> Option<usize> {
        self.reward_infos.iter().position(|info| !info.initialized())
    }

    pub fn reward_info(&self, index: usize) -> CoreResult<&RewardInfo> {
        self.reward_infos
            .get(index)
            .ok_or(YeveswapError::InvalidRewardIndex(index))
    }

    pub fn require_reward_authority(&self, index: usize, claimed: &Address) -> CoreResult<()> {
        let info = self.reward_info(index)?;
        require_authority(&info.authority, claimed, AuthorityRole::Reward)
    }

    /// Bind a reward mint to the lowest free slot.
    pub fn initialize_reward(&mut self, index: usize, mint: Address, vault: Address) -> CoreResult<()> {
        if index >= NUM_REWARDS {
            return Err(YeveswapError::InvalidRewardIndex(index));
        }
        match self.next_uninitialized_reward_index() {
            Some(lowest) if lowest == index => {}
            _ => return Err(YeveswapError::InvalidRewardIndex(index)),
        }
        self.reward_infos[index].mint = mint;
        self.reward_infos[index].vault = vault;
        Ok(())
    }

    pub fn update_emissions(
        &mut self,
        index: usize,
        reward_infos: [RewardInfo; NUM_REWARDS],
        timestamp: u64,
        emissions_per_second_x64: u128,
    ) -> CoreResult<()> {
        if index >= NUM_REWARDS {
            return Err(YeveswapError::InvalidRewardIndex(index));
        }
        self.update_rewards(reward_infos, timestamp);
        self.reward_infos[index].emissions_per_second_x64 = emissions_per_second_x64;
        Ok(())
    }

    pub fn update_reward_authority(&mut self, index: usize, authority: Address) -> CoreResult<()> {
        if index >= NUM_REWARDS {
            return Err(YeveswapError::InvalidRewardIndex(index));
        }
        self.reward_infos[index].authority = authority;
        Ok(())
    }
}

impl Persisted for Pool {
    const LEN: usize = Pool::LEN;
}

pub fn growth_globals_with_rewards(
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
    reward_infos: &[RewardInfo; NUM_REWARDS],
) -> GrowthSnapshot {
    let mut rewards = [0u128; NUM_REWARDS];
    for (growth, info) in rewards.iter_mut().zip(reward_infos.iter()) {
        if info.initialized() {
            *growth = info.growth_global_x64;
        }
    }
    GrowthSnapshot {
        fee_a: fee_growth_global_a,
        fee_b: fee_growth_global_b,
        rewards,
    }
}
