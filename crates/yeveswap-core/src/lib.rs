//! # Yeveswap Core
//!
//! Accounting engine for a concentrated liquidity AMM. Pools quote a Q64.64
//! square-root price, liquidity providers hold positions over tick ranges,
//! and swaps walk the price across initialized ticks while accruing fees and
//! reward emissions to the liquidity in range.
//!
//! Layers, bottom up:
//!
//! - [`state`]: persisted account records and their fixed binary layouts
//! - [`logic`]: pure next-state computations on those records
//! - [`registry`] and [`store`]: keyed in-memory account storage
//! - [`program`]: the operation surface, which validates, computes on copies,
//!   moves tokens through a [`token::TokenService`] and only then commits
//!
//! Token custody stays with the host. The engine emits token instructions and
//! [`events::Event`]s and never assumes a transfer succeeded until the host
//! says so.

pub mod constants;
pub mod error;
pub mod events;
pub mod logic;
pub mod program;
pub mod registry;
pub mod settings;
pub mod state;
pub mod store;
pub mod token;

pub use error::{AccountKind, AuthorityRole, CoreResult, ErrorKind, TokenSide, YeveswapError};
pub use events::Event;
pub use program::{
    DecreaseLiquidityParams, IncreaseLiquidityParams, InitializePoolParams, OperationOutput,
    Program, SwapParams,
};
pub use settings::EngineSettings;
pub use state::Address;
pub use token::{TokenBatch, TokenInstruction, TokenService, TokenServiceError, TransferDirection};
