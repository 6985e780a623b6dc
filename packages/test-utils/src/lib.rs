//! Test fixtures for the yeveswap engine: an in-memory [`TokenLedger`] and a
//! [`TestContext`] that wires it into a [`Program`] with a ready config.

pub mod constants;
pub mod helpers;
pub mod ledger;

use std::sync::Once;

pub use constants::*;
pub use helpers::*;
pub use ledger::TokenLedger;

use yeveswap_core::error::CoreResult;
use yeveswap_core::logic::PostSwapUpdate;
use yeveswap_core::state::{Pool, Position};
use yeveswap_core::{
    Address, EngineSettings, IncreaseLiquidityParams, InitializePoolParams, Program, SwapParams,
};

static INIT: Once = Once::new();

/// Install a test-friendly subscriber once per process. `RUST_LOG` overrides
/// the default `warn` filter.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Accounts of a pool created through [`TestContext::create_pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolFixture {
    pub address: Address,
    pub fee_tier: Address,
    pub token_mint_a: Address,
    pub token_vault_a: Address,
    pub token_mint_b: Address,
    pub token_vault_b: Address,
    pub tick_spacing: u16,
}

pub struct TestContext {
    pub program: Program<TokenLedger>,
    pub config: Address,
    pub fee_authority: Address,
    pub collect_protocol_fees_authority: Address,
    pub reward_emissions_super_authority: Address,
}

impl TestContext {
    pub fn new() -> CoreResult<Self> {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> CoreResult<Self> {
        init_test_tracing();

        let mut program = Program::with_settings(TokenLedger::new(), settings)?;
        let config = Address::new_unique();
        let fee_authority = Address::new_unique();
        let collect_protocol_fees_authority = Address::new_unique();
        let reward_emissions_super_authority = Address::new_unique();
        program.initialize_config(
            config,
            fee_authority,
            collect_protocol_fees_authority,
            reward_emissions_super_authority,
            DEFAULT_PROTOCOL_FEE_RATE,
        )?;

        Ok(Self {
            program,
            config,
            fee_authority,
            collect_protocol_fees_authority,
            reward_emissions_super_authority,
        })
    }

    pub fn ledger(&self) -> &TokenLedger {
        self.program.token_service()
    }

    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        self.program.token_service_mut()
    }

    /// Fee tier for `tick_spacing`, created on first use.
    pub fn fee_tier(&mut self, tick_spacing: u16, default_fee_rate: u16) -> CoreResult<Address> {
        if let Some(existing) = self.program.store().fee_tier_for(&self.config, tick_spacing) {
            return Ok(existing);
        }
        let fee_tier = Address::new_unique();
        self.program.initialize_fee_tier(
            self.config,
            fee_tier,
            self.fee_authority,
            tick_spacing,
            default_fee_rate,
        )?;
        Ok(fee_tier)
    }

    /// New pool over two fresh mints, mint A sorting first.
    pub fn create_pool(
        &mut self,
        tick_spacing: u16,
        fee_rate: u16,
        initial_sqrt_price: u128,
    ) -> CoreResult<PoolFixture> {
        let fee_tier = self.fee_tier(tick_spacing, fee_rate)?;
        let fixture = PoolFixture {
            address: Address::new_unique(),
            fee_tier,
            token_mint_a: Address::new_unique(),
            token_vault_a: Address::new_unique(),
            token_mint_b: Address::new_unique(),
            token_vault_b: Address::new_unique(),
            tick_spacing,
        };
        self.program.initialize_pool(InitializePoolParams {
            pool: fixture.address,
            config: self.config,
            fee_tier,
            token_mint_a: fixture.token_mint_a,
            token_vault_a: fixture.token_vault_a,
            token_mint_b: fixture.token_mint_b,
            token_vault_b: fixture.token_vault_b,
            initial_sqrt_price,
        })?;
        Ok(fixture)
    }

    pub fn pool(&self, fixture: &PoolFixture) -> CoreResult<Pool> {
        self.program.store().pool(&fixture.address).copied()
    }

    pub fn position(&self, position_mint: &Address) -> CoreResult<Position> {
        self.program.store().position(position_mint).copied()
    }

    /// Fresh account holding [`FUNDING_AMOUNT`] of both pool tokens.
    pub fn funded_account(&mut self, fixture: &PoolFixture) -> Address {
        let account = Address::new_unique();
        let ledger = self.ledger_mut();
        ledger.mint_to(account, fixture.token_mint_a, FUNDING_AMOUNT);
        ledger.mint_to(account, fixture.token_mint_b, FUNDING_AMOUNT);
        account
    }

    /// Initialize any of the pages at `start_tick_indexes` that do not exist yet.
    pub fn ensure_tick_arrays(
        &mut self,
        fixture: &PoolFixture,
        start_tick_indexes: &[i32],
    ) -> CoreResult<()> {
        for &start in start_tick_indexes {
            if !self.program.store().tick_arrays(&fixture.address)?.contains(start) {
                self.program.initialize_tick_array(fixture.address, start)?;
            }
        }
        Ok(())
    }

    /// Open a position, creating the pages it needs.
    pub fn open_position(
        &mut self,
        fixture: &PoolFixture,
        owner: Address,
        tick_lower_index: i32,
        tick_upper_index: i32,
    ) -> CoreResult<Address> {
        self.ensure_tick_arrays(
            fixture,
            &position_tick_array_starts(tick_lower_index, tick_upper_index, fixture.tick_spacing),
        )?;
        let position_mint = Address::new_unique();
        self.program.open_position(
            fixture.address,
            owner,
            position_mint,
            tick_lower_index,
            tick_upper_index,
        )?;
        Ok(position_mint)
    }

    /// Open a position and deposit `liquidity` into it with no slippage bounds.
    pub fn provide_liquidity(
        &mut self,
        fixture: &PoolFixture,
        owner: Address,
        tick_lower_index: i32,
        tick_upper_index: i32,
        liquidity: u128,
        timestamp: u64,
    ) -> CoreResult<Address> {
        let position_mint = self.open_position(fixture, owner, tick_lower_index, tick_upper_index)?;
        self.program.increase_liquidity(IncreaseLiquidityParams {
            position_mint,
            owner,
            liquidity_amount: liquidity,
            token_max_a: u64::MAX,
            token_max_b: u64::MAX,
            timestamp,
        })?;
        Ok(position_mint)
    }

    /// Swap through up to the configured number of pages from the current
    /// tick, creating missing ones. No threshold, no price limit unless given.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        fixture: &PoolFixture,
        trader: Address,
        amount: u64,
        amount_specified_is_input: bool,
        a_to_b: bool,
        sqrt_price_limit: u128,
        timestamp: u64,
    ) -> CoreResult<PostSwapUpdate> {
        let pool = self.pool(fixture)?;
        let starts = swap_tick_array_starts(
            pool.tick_current_index,
            fixture.tick_spacing,
            a_to_b,
            self.program.settings().max_swap_tick_arrays,
        );
        self.ensure_tick_arrays(fixture, &starts)?;

        let other_amount_threshold = if amount_specified_is_input { 0 } else { u64::MAX };
        let output = self.program.swap(SwapParams {
            pool: fixture.address,
            trader,
            amount,
            other_amount_threshold,
            sqrt_price_limit,
            amount_specified_is_input,
            a_to_b,
            tick_array_start_indexes: starts,
            timestamp,
        })?;
        Ok(output.value)
    }
}
