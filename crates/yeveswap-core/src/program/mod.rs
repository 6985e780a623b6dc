//! # Operation Surface
//!
//! [`Program`] owns the account store and the token service. Every operation
//! follows the same shape:
//!
//! 1. validate inputs and authority against current state
//! 2. compute every next account value on copies
//! 3. submit the operation's token batch
//! 4. commit the copies only if the batch succeeded
//!
//! A failed operation therefore never leaves partial writes behind.

mod admin;
mod pool;
mod position;
mod swap;

pub use pool::InitializePoolParams;
pub use position::{DecreaseLiquidityParams, IncreaseLiquidityParams};
pub use swap::SwapParams;

use tracing::warn;

use crate::error::{AuthorityRole, CoreResult, YeveswapError};
use crate::events::Event;
use crate::settings::EngineSettings;
use crate::state::Address;
use crate::store::AccountStore;
use crate::token::{TokenBatch, TokenInstruction, TokenService};

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutput<T> {
    pub value: T,
    /// Token instructions the token service executed, in order
    pub instructions: Vec<TokenInstruction>,
    pub events: Vec<Event>,
}

impl<T> OperationOutput<T> {
    fn new(value: T, batch: TokenBatch, events: Vec<Event>) -> Self {
        Self {
            value,
            instructions: batch.into_instructions(),
            events,
        }
    }

    fn without_transfers(value: T, event: impl Into<Event>) -> Self {
        Self::new(value, TokenBatch::new(), vec![event.into()])
    }
}

pub struct Program<S: TokenService> {
    store: AccountStore,
    token_service: S,
    settings: EngineSettings,
}

impl<S: TokenService> Program<S> {
    pub fn new(token_service: S) -> Self {
        Self {
            store: AccountStore::new(),
            token_service,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(token_service: S, settings: EngineSettings) -> CoreResult<Self> {
        settings.validate()?;
        Ok(Self {
            store: AccountStore::new(),
            token_service,
            settings,
        })
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn token_service(&self) -> &S {
        &self.token_service
    }

    pub fn token_service_mut(&mut self) -> &mut S {
        &mut self.token_service
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn execute_batch(&mut self, batch: &TokenBatch) -> CoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.token_service
            .execute(batch.instructions())
            .map_err(|error| {
                warn!(%error, instructions = batch.instructions().len(), "token batch rejected");
                YeveswapError::from(error)
            })
    }

    /// Caller must hold the receipt token of `position_mint`.
    fn require_position_owner(&self, owner: &Address, position_mint: &Address) -> CoreResult<()> {
        if self.token_service.receipt_balance(owner, position_mint) == 0 {
            return Err(YeveswapError::unauthorized(AuthorityRole::PositionOwner, owner));
        }
        Ok(())
    }
}
