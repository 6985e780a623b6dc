//! # Engine Errors
//!
//! Every rejected operation leaves all state untouched and reports exactly one
//! of these. [`YeveswapError::kind`] groups them for callers that only need to
//! know whether to fix inputs, fix authority, or give up.

use std::fmt;

use thiserror::Error;
use yeveswap_math::MathError;

use crate::state::Address;
use crate::token::TokenServiceError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Validation,
    /// Wrong signer for a privileged action
    Authorization,
    /// Account already exists, or a required account is missing
    StateConflict,
    /// Overflow, division by zero, or a value outside the representable domain
    Arithmetic,
    /// Computed token amount violates a caller-supplied bound
    SlippageExceeded,
    /// The external token service rejected the transfer batch
    TokenService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityRole {
    Fee,
    CollectProtocolFees,
    RewardEmissionsSuper,
    Reward,
    PositionOwner,
}

impl fmt::Display for AuthorityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorityRole::Fee => "fee authority",
            AuthorityRole::CollectProtocolFees => "collect protocol fees authority",
            AuthorityRole::RewardEmissionsSuper => "reward emissions super authority",
            AuthorityRole::Reward => "reward authority",
            AuthorityRole::PositionOwner => "position owner",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Config,
    FeeTier,
    Pool,
    TickArray,
    Position,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountKind::Config => "config",
            AccountKind::FeeTier => "fee tier",
            AccountKind::Pool => "pool",
            AccountKind::TickArray => "tick array",
            AccountKind::Position => "position",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSide {
    A,
    B,
}

impl fmt::Display for TokenSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSide::A => f.write_str("A"),
            TokenSide::B => f.write_str("B"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YeveswapError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Tick index {0} out of bounds or range is inverted")]
    InvalidTickIndex(i32),

    #[error("Tick {tick_index} is not a multiple of tick spacing {tick_spacing}")]
    TickNotAligned { tick_index: i32, tick_spacing: u16 },

    #[error("Tick spacing must be greater than zero")]
    InvalidTickSpacing,

    #[error("Tick array start {start_tick_index} is not aligned to the page span")]
    InvalidTickArrayStart { start_tick_index: i32 },

    #[error("Token mints A and B must differ")]
    DuplicateTokenMints,

    #[error("Token mint A must sort before token mint B")]
    InvalidTokenMintOrder,

    #[error("Sqrt price out of bounds")]
    SqrtPriceOutOfBounds,

    #[error("Sqrt price limit is on the wrong side of the current price")]
    InvalidSqrtPriceLimitDirection,

    #[error("No tradable amount to swap")]
    ZeroTradableAmount,

    #[error("Liquidity amount must be greater than zero")]
    LiquidityZero,

    #[error("Liquidity amount must be less than i128::MAX")]
    LiquidityTooHigh,

    #[error("Fee rate {0} exceeds the maximum")]
    FeeRateMaxExceeded(u16),

    #[error("Protocol fee rate {0} exceeds the maximum")]
    ProtocolFeeRateMaxExceeded(u16),

    #[error("Reward index {0} is invalid")]
    InvalidRewardIndex(usize),

    #[error("Reward slot {0} is not initialized")]
    RewardNotInitialized(usize),

    #[error("Reward vault cannot cover one emission window")]
    RewardVaultAmountInsufficient,

    #[error("Timestamp {timestamp} precedes last reward update {last_updated}")]
    InvalidTimestamp { timestamp: u64, last_updated: u64 },

    #[error("Swap supplied {supplied} tick arrays, at most {max} are allowed")]
    TooManyTickArrays { supplied: usize, max: usize },

    #[error("Tick arrays are not a contiguous sequence in swap direction starting at the current tick")]
    InvalidTickArraySequence,

    #[error("{0} does not belong to the account it was paired with")]
    AccountRelationMismatch(AccountKind),

    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),

    #[error("Account data length {actual} does not match expected {expected}")]
    AccountDataLength { expected: usize, actual: usize },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    // ========================================================================
    // Authorization Errors
    // ========================================================================
    #[error("Caller is not the {0}")]
    Unauthorized(AuthorityRole),

    // ========================================================================
    // State Conflict Errors
    // ========================================================================
    #[error("{0} already initialized")]
    AccountAlreadyInitialized(AccountKind),

    #[error("{0} not found")]
    AccountNotFound(AccountKind),

    #[error("No tick array starts at {start_tick_index}")]
    TickArrayNotFound { start_tick_index: i32 },

    #[error("Supplied tick arrays do not cover the price movement")]
    InsufficientTickArrays,

    #[error("Position still holds liquidity or uncollected fees and rewards")]
    ClosePositionNotEmpty,

    // ========================================================================
    // Arithmetic Errors
    // ========================================================================
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("Liquidity net overflow or underflow")]
    LiquidityNetError,

    #[error("Owed fee overflow")]
    FeeOwedOverflow,

    #[error("Owed reward overflow")]
    RewardOwedOverflow,

    #[error("Amount calculated overflows")]
    AmountCalcOverflow,

    #[error("Amount remaining overflows")]
    AmountRemainingOverflow,

    #[error("Protocol fee owed overflows")]
    ProtocolFeeOverflow,

    // ========================================================================
    // Slippage Errors
    // ========================================================================
    #[error("Token {side} required {required} exceeds maximum {max}")]
    TokenMaxExceeded { side: TokenSide, required: u64, max: u64 },

    #[error("Token {side} returned {returned} is below minimum {min}")]
    TokenMinSubceeded { side: TokenSide, returned: u64, min: u64 },

    #[error("Amount out {amount} below minimum threshold {threshold}")]
    AmountOutBelowMinimum { amount: u64, threshold: u64 },

    #[error("Amount in {amount} above maximum threshold {threshold}")]
    AmountInAboveMaximum { amount: u64, threshold: u64 },

    #[error("Swap without a price limit could not fill the specified amount")]
    PartialFillError,

    // ========================================================================
    // Token Service Errors
    // ========================================================================
    #[error(transparent)]
    TokenService(#[from] TokenServiceError),
}

impl YeveswapError {
    pub fn kind(&self) -> ErrorKind {
        use YeveswapError::*;

        match self {
            InvalidTickIndex(_)
            | TickNotAligned { .. }
            | InvalidTickSpacing
            | InvalidTickArrayStart { .. }
            | DuplicateTokenMints
            | InvalidTokenMintOrder
            | SqrtPriceOutOfBounds
            | InvalidSqrtPriceLimitDirection
            | ZeroTradableAmount
            | LiquidityZero
            | LiquidityTooHigh
            | FeeRateMaxExceeded(_)
            | ProtocolFeeRateMaxExceeded(_)
            | InvalidRewardIndex(_)
            | RewardNotInitialized(_)
            | RewardVaultAmountInsufficient
            | InvalidTimestamp { .. }
            | TooManyTickArrays { .. }
            | InvalidTickArraySequence
            | AccountRelationMismatch(_)
            | InvalidSettings(_)
            | AccountDataLength { .. }
            | Serialization(_) => ErrorKind::Validation,

            Unauthorized(_) => ErrorKind::Authorization,

            AccountAlreadyInitialized(_)
            | AccountNotFound(_)
            | TickArrayNotFound { .. }
            | InsufficientTickArrays
            | ClosePositionNotEmpty => ErrorKind::StateConflict,

            Math(_)
            | LiquidityNetError
            | FeeOwedOverflow
            | RewardOwedOverflow
            | AmountCalcOverflow
            | AmountRemainingOverflow
            | ProtocolFeeOverflow => ErrorKind::Arithmetic,

            TokenMaxExceeded { .. }
            | TokenMinSubceeded { .. }
            | AmountOutBelowMinimum { .. }
            | AmountInAboveMaximum { .. }
            | PartialFillError => ErrorKind::SlippageExceeded,

            TokenService(_) => ErrorKind::TokenService,
        }
    }

    /// Whether the same operation can succeed after correcting inputs,
    /// authority or bounds. Arithmetic failures and state conflicts need
    /// different inputs altogether.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Arithmetic | ErrorKind::StateConflict
        )
    }

    pub fn unauthorized(role: AuthorityRole, claimed: &Address) -> Self {
        tracing::warn!(%role, %claimed, "rejected privileged call");
        YeveswapError::Unauthorized(role)
    }
}

pub type CoreResult<T> = Result<T, YeveswapError>;
