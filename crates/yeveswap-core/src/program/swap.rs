use tracing::debug;
use yeveswap_math::sqrt_price_x64_to_price;

use super::{OperationOutput, Program};
use crate::error::{CoreResult, YeveswapError};
use crate::events::Swapped;
use crate::logic::swap::{swap, PostSwapUpdate};
use crate::state::Address;
use crate::token::{TokenBatch, TokenService, TransferDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub pool: Address,
    pub trader: Address,
    /// Input amount when `amount_specified_is_input`, output amount otherwise
    pub amount: u64,
    /// Minimum output for exact-input swaps, maximum input for exact-output swaps
    pub other_amount_threshold: u64,
    /// Q64.64, zero for no limit
    pub sqrt_price_limit: u128,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    /// Start indexes of the tick array pages to traverse, in swap direction
    pub tick_array_start_indexes: Vec<i32>,
    pub timestamp: u64,
}

impl<S: TokenService> Program<S> {
    pub fn swap(&mut self, params: SwapParams) -> CoreResult<OperationOutput<PostSwapUpdate>> {
        let mut pool = *self.store.pool(&params.pool)?;
        let mut tick_sequence = self.store.tick_arrays(&params.pool)?.swap_sequence(
            &params.tick_array_start_indexes,
            pool.tick_current_index,
            params.a_to_b,
            self.settings.max_swap_tick_arrays,
        )?;

        let update = swap(
            &pool,
            &mut tick_sequence,
            params.amount,
            params.sqrt_price_limit,
            params.amount_specified_is_input,
            params.a_to_b,
            params.timestamp,
        )?;

        let (amount_in, amount_out) = update.input_output(params.a_to_b);
        if params.amount_specified_is_input {
            if amount_out < params.other_amount_threshold {
                return Err(YeveswapError::AmountOutBelowMinimum {
                    amount: amount_out,
                    threshold: params.other_amount_threshold,
                });
            }
        } else if amount_in > params.other_amount_threshold {
            return Err(YeveswapError::AmountInAboveMaximum {
                amount: amount_in,
                threshold: params.other_amount_threshold,
            });
        }

        let sqrt_price_before = pool.sqrt_price;
        pool.update_after_swap(
            update.next_liquidity,
            update.next_tick_index,
            update.next_sqrt_price,
            update.next_fee_growth_global,
            update.next_reward_infos,
            update.next_protocol_fee,
            params.a_to_b,
            params.timestamp,
        )?;

        let (mint_in, vault_in, mint_out, vault_out) = if params.a_to_b {
            (pool.token_mint_a, pool.token_vault_a, pool.token_mint_b, pool.token_vault_b)
        } else {
            (pool.token_mint_b, pool.token_vault_b, pool.token_mint_a, pool.token_vault_a)
        };
        let mut batch = TokenBatch::new();
        batch
            .transfer(mint_in, vault_in, params.trader, amount_in, TransferDirection::Deposit)
            .transfer(mint_out, vault_out, params.trader, amount_out, TransferDirection::Withdraw);
        self.execute_batch(&batch)?;

        self.store
            .tick_arrays_mut(&params.pool)?
            .commit_arrays(tick_sequence.into_arrays())?;
        self.store.put_pool(params.pool, pool)?;

        debug!(
            pool = %params.pool,
            a_to_b = params.a_to_b,
            amount_in,
            amount_out,
            protocol_fee = update.next_protocol_fee,
            tick_index_after = update.next_tick_index,
            price_after = sqrt_price_x64_to_price(update.next_sqrt_price, 0, 0),
            "swap executed"
        );
        let event = Swapped {
            pool: params.pool,
            a_to_b: params.a_to_b,
            amount_in,
            amount_out,
            protocol_fee: update.next_protocol_fee,
            sqrt_price_before,
            sqrt_price_after: update.next_sqrt_price,
            tick_index_after: update.next_tick_index,
            liquidity_after: update.next_liquidity,
        };
        Ok(OperationOutput::new(update, batch, vec![event.into()]))
    }
}
