//! Position lifecycle: open, modify liquidity, collect, close

use tracing::{debug, info};
use yeveswap_math::convert_to_liquidity_delta;

use super::{OperationOutput, Program};
use crate::error::{AccountKind, CoreResult, TokenSide, YeveswapError};
use crate::events::{
    FeesCollected, LiquidityChanged, PositionClosed, PositionOpened, RewardCollected,
};
use crate::logic::liquidity::{calculate_liquidity_token_deltas, calculate_modify_liquidity};
use crate::logic::position::next_position_modify_liquidity_update;
use crate::logic::tick::next_growths_inside;
use crate::state::{Address, Pool, Position, Tick};
use crate::token::{TokenBatch, TokenInstruction, TokenService, TransferDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncreaseLiquidityParams {
    pub position_mint: Address,
    pub owner: Address,
    pub liquidity_amount: u128,
    pub token_max_a: u64,
    pub token_max_b: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecreaseLiquidityParams {
    pub position_mint: Address,
    pub owner: Address,
    pub liquidity_amount: u128,
    pub token_min_a: u64,
    pub token_min_b: u64,
    pub timestamp: u64,
}

/// Caller's slippage bounds on the token amounts of a liquidity change
enum TokenBounds {
    Max { a: u64, b: u64 },
    Min { a: u64, b: u64 },
}

impl TokenBounds {
    fn check(&self, amount_a: u64, amount_b: u64) -> CoreResult<()> {
        match *self {
            TokenBounds::Max { a, b } => {
                if amount_a > a {
                    return Err(YeveswapError::TokenMaxExceeded {
                        side: TokenSide::A,
                        required: amount_a,
                        max: a,
                    });
                }
                if amount_b > b {
                    return Err(YeveswapError::TokenMaxExceeded {
                        side: TokenSide::B,
                        required: amount_b,
                        max: b,
                    });
                }
            }
            TokenBounds::Min { a, b } => {
                if amount_a < a {
                    return Err(YeveswapError::TokenMinSubceeded {
                        side: TokenSide::A,
                        returned: amount_a,
                        min: a,
                    });
                }
                if amount_b < b {
                    return Err(YeveswapError::TokenMinSubceeded {
                        side: TokenSide::B,
                        returned: amount_b,
                        min: b,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<S: TokenService> Program<S> {
    /// Open an empty position over `[tick_lower_index, tick_upper_index)` and
    /// mint its receipt to `owner`.
    pub fn open_position(
        &mut self,
        pool: Address,
        owner: Address,
        position_mint: Address,
        tick_lower_index: i32,
        tick_upper_index: i32,
    ) -> CoreResult<OperationOutput<()>> {
        let pool_record = self.store.pool(&pool)?;
        let position = Position::open(
            pool,
            pool_record,
            position_mint,
            tick_lower_index,
            tick_upper_index,
        )?;
        if self.store.position(&position_mint).is_ok() {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::Position));
        }

        // Checkpoint at the current inside growth. Ticks on pages that do not
        // exist yet are uninitialized.
        let registry = self.store.tick_arrays(&pool)?;
        let tick_lower = registry.get_tick(tick_lower_index).copied().unwrap_or_default();
        let tick_upper = registry.get_tick(tick_upper_index).copied().unwrap_or_default();
        let growth_inside = next_growths_inside(
            pool_record.tick_current_index,
            &tick_lower,
            tick_lower_index,
            &tick_upper,
            tick_upper_index,
            &pool_record.growth_globals(),
        );
        let position = next_position_modify_liquidity_update(&position, 0, &growth_inside)?;

        let mut batch = TokenBatch::new();
        batch.push(TokenInstruction::MintReceipt {
            position_mint,
            owner,
        });
        self.execute_batch(&batch)?;
        self.store.insert_position(position)?;

        info!(%pool, %position_mint, tick_lower_index, tick_upper_index, "position opened");
        let event = PositionOpened {
            pool,
            position_mint,
            owner,
            tick_lower_index,
            tick_upper_index,
        };
        Ok(OperationOutput::new((), batch, vec![event.into()]))
    }

    /// Deposit liquidity. Returns the `(amount_a, amount_b)` paid in, rounded up.
    pub fn increase_liquidity(
        &mut self,
        params: IncreaseLiquidityParams,
    ) -> CoreResult<OperationOutput<(u64, u64)>> {
        if params.liquidity_amount == 0 {
            return Err(YeveswapError::LiquidityZero);
        }
        let liquidity_delta = convert_to_liquidity_delta(params.liquidity_amount, true)
            .map_err(|_| YeveswapError::LiquidityTooHigh)?;
        self.modify_liquidity(
            params.position_mint,
            params.owner,
            liquidity_delta,
            params.timestamp,
            TokenBounds::Max {
                a: params.token_max_a,
                b: params.token_max_b,
            },
        )
    }

    /// Withdraw liquidity. Returns the `(amount_a, amount_b)` paid out, rounded down.
    pub fn decrease_liquidity(
        &mut self,
        params: DecreaseLiquidityParams,
    ) -> CoreResult<OperationOutput<(u64, u64)>> {
        if params.liquidity_amount == 0 {
            return Err(YeveswapError::LiquidityZero);
        }
        let liquidity_delta = convert_to_liquidity_delta(params.liquidity_amount, false)
            .map_err(|_| YeveswapError::LiquidityTooHigh)?;
        self.modify_liquidity(
            params.position_mint,
            params.owner,
            liquidity_delta,
            params.timestamp,
            TokenBounds::Min {
                a: params.token_min_a,
                b: params.token_min_b,
            },
        )
    }

    fn modify_liquidity(
        &mut self,
        position_mint: Address,
        owner: Address,
        liquidity_delta: i128,
        timestamp: u64,
        bounds: TokenBounds,
    ) -> CoreResult<OperationOutput<(u64, u64)>> {
        self.require_position_owner(&owner, &position_mint)?;
        let position = *self.store.position(&position_mint)?;
        let (pool_address, mut pool, tick_lower, tick_upper) = self.position_accounts(&position)?;

        let update = calculate_modify_liquidity(
            &pool,
            &position,
            &tick_lower,
            &tick_upper,
            liquidity_delta,
            timestamp,
        )?;
        let (amount_a, amount_b) = calculate_liquidity_token_deltas(
            pool.tick_current_index,
            pool.sqrt_price,
            &position,
            liquidity_delta,
        )?;
        bounds.check(amount_a, amount_b)?;

        let direction = if liquidity_delta > 0 {
            TransferDirection::Deposit
        } else {
            TransferDirection::Withdraw
        };
        let mut batch = TokenBatch::new();
        batch
            .transfer(pool.token_mint_a, pool.token_vault_a, owner, amount_a, direction)
            .transfer(pool.token_mint_b, pool.token_vault_b, owner, amount_b, direction);
        self.execute_batch(&batch)?;

        pool.update_rewards_and_liquidity(update.reward_infos, update.pool_liquidity, timestamp);
        let registry = self.store.tick_arrays_mut(&pool_address)?;
        registry.set_tick(position.tick_lower_index, update.tick_lower_update)?;
        registry.set_tick(position.tick_upper_index, update.tick_upper_update)?;
        self.store.put_pool(pool_address, pool)?;
        self.store.put_position(update.position_update)?;

        debug!(
            pool = %pool_address,
            %position_mint,
            liquidity_delta,
            amount_a,
            amount_b,
            pool_liquidity = update.pool_liquidity,
            "liquidity modified"
        );
        let event = LiquidityChanged {
            pool: pool_address,
            position_mint,
            liquidity_delta,
            amount_a,
            amount_b,
            pool_liquidity: update.pool_liquidity,
        };
        Ok(OperationOutput::new((amount_a, amount_b), batch, vec![event.into()]))
    }

    /// Accrue rewards to `timestamp` and move the position's newly earned fees
    /// and rewards into its owed amounts. Anyone may call this.
    pub fn update_fees_and_rewards(
        &mut self,
        position_mint: Address,
        timestamp: u64,
    ) -> CoreResult<OperationOutput<Position>> {
        let position = *self.store.position(&position_mint)?;
        let (pool_address, mut pool, tick_lower, tick_upper) = self.position_accounts(&position)?;

        let update =
            calculate_modify_liquidity(&pool, &position, &tick_lower, &tick_upper, 0, timestamp)?;
        pool.update_rewards(update.reward_infos, timestamp);
        self.store.put_pool(pool_address, pool)?;
        self.store.put_position(update.position_update)?;

        Ok(OperationOutput::new(
            update.position_update,
            TokenBatch::new(),
            Vec::new(),
        ))
    }

    /// Pay out owed fees after syncing them to `timestamp`. Returns `(amount_a, amount_b)`.
    pub fn collect_fees(
        &mut self,
        position_mint: Address,
        owner: Address,
        timestamp: u64,
    ) -> CoreResult<OperationOutput<(u64, u64)>> {
        self.require_position_owner(&owner, &position_mint)?;
        let (pool_address, pool, mut position) = self.synced_position(&position_mint, timestamp)?;

        let amount_a = position.fee_owed_a;
        let amount_b = position.fee_owed_b;
        let mut batch = TokenBatch::new();
        batch
            .transfer(
                pool.token_mint_a,
                pool.token_vault_a,
                owner,
                amount_a,
                TransferDirection::Withdraw,
            )
            .transfer(
                pool.token_mint_b,
                pool.token_vault_b,
                owner,
                amount_b,
                TransferDirection::Withdraw,
            );
        self.execute_batch(&batch)?;

        position.reset_fees_owed();
        self.store.put_pool(pool_address, pool)?;
        self.store.put_position(position)?;

        debug!(%position_mint, amount_a, amount_b, "fees collected");
        let event = FeesCollected {
            pool: pool_address,
            position_mint,
            amount_a,
            amount_b,
        };
        Ok(OperationOutput::new((amount_a, amount_b), batch, vec![event.into()]))
    }

    /// Pay out one reward slot's owed amount after syncing it to `timestamp`.
    pub fn collect_reward(
        &mut self,
        position_mint: Address,
        owner: Address,
        reward_index: u8,
        timestamp: u64,
    ) -> CoreResult<OperationOutput<u64>> {
        self.require_position_owner(&owner, &position_mint)?;
        let index = usize::from(reward_index);
        let (pool_address, pool, mut position) = self.synced_position(&position_mint, timestamp)?;
        let reward_info = *pool.reward_info(index)?;
        if !reward_info.initialized() {
            return Err(YeveswapError::RewardNotInitialized(index));
        }

        let amount = position.reset_reward_owed(index)?;
        let mut batch = TokenBatch::new();
        batch.transfer(
            reward_info.mint,
            reward_info.vault,
            owner,
            amount,
            TransferDirection::Withdraw,
        );
        self.execute_batch(&batch)?;

        self.store.put_pool(pool_address, pool)?;
        self.store.put_position(position)?;

        debug!(%position_mint, reward_index, amount, "reward collected");
        let event = RewardCollected {
            pool: pool_address,
            position_mint,
            reward_index,
            amount,
        };
        Ok(OperationOutput::new(amount, batch, vec![event.into()]))
    }

    /// Delete an empty position and burn its receipt.
    pub fn close_position(
        &mut self,
        position_mint: Address,
        owner: Address,
    ) -> CoreResult<OperationOutput<()>> {
        self.require_position_owner(&owner, &position_mint)?;
        let position = *self.store.position(&position_mint)?;
        if !position.is_position_empty() {
            return Err(YeveswapError::ClosePositionNotEmpty);
        }

        let mut batch = TokenBatch::new();
        batch.push(TokenInstruction::BurnReceipt {
            position_mint,
            owner,
        });
        self.execute_batch(&batch)?;
        self.store.remove_position(&position_mint)?;

        info!(pool = %position.pool, %position_mint, "position closed");
        let event = PositionClosed {
            pool: position.pool,
            position_mint,
            owner,
        };
        Ok(OperationOutput::new((), batch, vec![event.into()]))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Pool copy and boundary ticks of `position`.
    fn position_accounts(&self, position: &Position) -> CoreResult<(Address, Pool, Tick, Tick)> {
        let pool = *self.store.pool(&position.pool)?;
        let registry = self.store.tick_arrays(&position.pool)?;
        let tick_lower = *registry.get_tick(position.tick_lower_index)?;
        let tick_upper = *registry.get_tick(position.tick_upper_index)?;
        Ok((position.pool, pool, tick_lower, tick_upper))
    }

    /// Copies of the pool and position with owed amounts brought up to
    /// `timestamp`. A position without liquidity has nothing new to accrue.
    fn synced_position(
        &self,
        position_mint: &Address,
        timestamp: u64,
    ) -> CoreResult<(Address, Pool, Position)> {
        let position = *self.store.position(position_mint)?;
        if position.liquidity == 0 {
            let pool = *self.store.pool(&position.pool)?;
            return Ok((position.pool, pool, position));
        }

        let (pool_address, mut pool, tick_lower, tick_upper) = self.position_accounts(&position)?;
        let update =
            calculate_modify_liquidity(&pool, &position, &tick_lower, &tick_upper, 0, timestamp)?;
        pool.update_rewards(update.reward_infos, timestamp);
        Ok((pool_address, pool, update.position_update))
    }
}
