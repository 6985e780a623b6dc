//! Pool creation, tick array pages and reward slots

use tracing::{debug, info};
use yeveswap_math::{emissions_over_window, sqrt_price_x64_to_price};

use super::admin::authority_changed;
use super::{OperationOutput, Program};
use crate::error::{AccountKind, CoreResult, YeveswapError};
use crate::events::{
    AuthorityKind, PoolInitialized, RewardEmissionsSet, RewardInitialized, TickArrayInitialized,
};
use crate::logic::reward::next_pool_reward_infos;
use crate::state::{Address, Pool, PoolInit};
use crate::token::TokenService;

/// Accounts and price for a new pool. Fee and tick spacing come from the fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializePoolParams {
    pub pool: Address,
    pub config: Address,
    pub fee_tier: Address,
    pub token_mint_a: Address,
    pub token_vault_a: Address,
    pub token_mint_b: Address,
    pub token_vault_b: Address,
    /// Q64.64
    pub initial_sqrt_price: u128,
}

impl<S: TokenService> Program<S> {
    pub fn initialize_pool(
        &mut self,
        params: InitializePoolParams,
    ) -> CoreResult<OperationOutput<()>> {
        let config = *self.store.config(&params.config)?;
        let fee_tier = *self.store.fee_tier(&params.fee_tier)?;
        if fee_tier.config != params.config {
            return Err(YeveswapError::AccountRelationMismatch(AccountKind::FeeTier));
        }

        let pool = Pool::new(PoolInit {
            config: params.config,
            tick_spacing: fee_tier.tick_spacing,
            fee_rate: fee_tier.default_fee_rate,
            protocol_fee_rate: config.default_protocol_fee_rate,
            sqrt_price: params.initial_sqrt_price,
            token_mint_a: params.token_mint_a,
            token_vault_a: params.token_vault_a,
            token_mint_b: params.token_mint_b,
            token_vault_b: params.token_vault_b,
            reward_authority: config.reward_emissions_super_authority,
        })?;
        self.store.insert_pool(params.pool, pool)?;

        info!(
            pool = %params.pool,
            tick_spacing = pool.tick_spacing,
            price = sqrt_price_x64_to_price(pool.sqrt_price, 0, 0),
            tick_current_index = pool.tick_current_index,
            "pool initialized"
        );
        Ok(OperationOutput::without_transfers(
            (),
            PoolInitialized {
                pool: params.pool,
                config: params.config,
                token_mint_a: pool.token_mint_a,
                token_mint_b: pool.token_mint_b,
                tick_spacing: pool.tick_spacing,
                fee_rate: pool.fee_rate,
                sqrt_price: pool.sqrt_price,
                tick_current_index: pool.tick_current_index,
            },
        ))
    }

    pub fn initialize_tick_array(
        &mut self,
        pool: Address,
        start_tick_index: i32,
    ) -> CoreResult<OperationOutput<()>> {
        self.store
            .tick_arrays_mut(&pool)?
            .initialize_tick_array(start_tick_index)?;
        Ok(OperationOutput::without_transfers(
            (),
            TickArrayInitialized {
                pool,
                start_tick_index,
            },
        ))
    }

    // ========================================================================
    // Reward slots
    // ========================================================================

    /// Bind `mint` and `vault` to the lowest free reward slot, which must be `reward_index`.
    pub fn initialize_reward(
        &mut self,
        pool: Address,
        reward_authority: Address,
        reward_index: u8,
        mint: Address,
        vault: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let index = usize::from(reward_index);
        let mut record = *self.store.pool(&pool)?;
        record.require_reward_authority(index, &reward_authority)?;
        record.initialize_reward(index, mint, vault)?;
        self.store.put_pool(pool, record)?;

        info!(%pool, reward_index, %mint, "reward initialized");
        Ok(OperationOutput::without_transfers(
            (),
            RewardInitialized {
                pool,
                reward_index,
                mint,
                vault,
            },
        ))
    }

    /// Set a slot's emission rate after accruing growth up to `timestamp`.
    ///
    /// The vault must hold at least one emission window's worth of tokens at
    /// the new rate.
    pub fn set_reward_emissions(
        &mut self,
        pool: Address,
        reward_authority: Address,
        reward_index: u8,
        emissions_per_second_x64: u128,
        reward_vault_balance: u64,
        timestamp: u64,
    ) -> CoreResult<OperationOutput<()>> {
        let index = usize::from(reward_index);
        let mut record = *self.store.pool(&pool)?;
        record.require_reward_authority(index, &reward_authority)?;
        if !record.reward_info(index)?.initialized() {
            return Err(YeveswapError::RewardNotInitialized(index));
        }

        let emissions_per_window = emissions_over_window(
            self.settings.reward_emission_window_secs,
            emissions_per_second_x64,
        )?;
        if reward_vault_balance < emissions_per_window {
            return Err(YeveswapError::RewardVaultAmountInsufficient);
        }

        let reward_infos = next_pool_reward_infos(&record, timestamp)?;
        record.update_emissions(index, reward_infos, timestamp, emissions_per_second_x64)?;
        self.store.put_pool(pool, record)?;

        debug!(%pool, reward_index, emissions_per_second_x64, timestamp, "reward emissions set");
        Ok(OperationOutput::without_transfers(
            (),
            RewardEmissionsSet {
                pool,
                reward_index,
                emissions_per_second_x64,
                timestamp,
            },
        ))
    }

    pub fn set_reward_authority(
        &mut self,
        pool: Address,
        reward_authority: Address,
        reward_index: u8,
        new_reward_authority: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let index = usize::from(reward_index);
        let mut record = *self.store.pool(&pool)?;
        record.require_reward_authority(index, &reward_authority)?;
        record.update_reward_authority(index, new_reward_authority)?;
        self.store.put_pool(pool, record)?;

        Ok(authority_changed(
            record.config,
            AuthorityKind::Reward { pool, reward_index },
            new_reward_authority,
        ))
    }

    pub fn set_reward_authority_by_super_authority(
        &mut self,
        pool: Address,
        reward_emissions_super_authority: Address,
        reward_index: u8,
        new_reward_authority: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let index = usize::from(reward_index);
        let mut record = *self.store.pool(&pool)?;
        self.store
            .config(&record.config)?
            .require_reward_emissions_super_authority(&reward_emissions_super_authority)?;
        record.update_reward_authority(index, new_reward_authority)?;
        self.store.put_pool(pool, record)?;

        Ok(authority_changed(
            record.config,
            AuthorityKind::Reward { pool, reward_index },
            new_reward_authority,
        ))
    }
}
