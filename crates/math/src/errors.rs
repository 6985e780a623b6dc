//! # Math Errors
//!
//! Every fallible operation in this crate reports one of these instead of
//! wrapping, saturating or silently truncating.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    // ========================================================================
    // Arithmetic
    // ========================================================================
    #[error("Multiplication overflow")]
    MultiplicationOverflow,

    #[error("Multiplication with shift right overflow")]
    MultiplicationShiftRightOverflow,

    #[error("Division by zero")]
    DivideByZero,

    #[error("Unable to down cast number")]
    NumberDownCastError,

    #[error("Token amount does not fit in u64")]
    TokenAmountOverflow,

    // ========================================================================
    // Liquidity
    // ========================================================================
    #[error("Liquidity overflow")]
    LiquidityOverflow,

    #[error("Liquidity underflow")]
    LiquidityUnderflow,

    #[error("Liquidity amount must be less than i128::MAX")]
    LiquidityTooHigh,

    // ========================================================================
    // Price and Tick Domain
    // ========================================================================
    #[error("Provided sqrt price out of bounds")]
    SqrtPriceOutOfBounds,

    #[error("Tick index out of bounds: {0}")]
    TickIndexOutOfBounds(i32),

    #[error("Price cannot be represented as Q64.64")]
    InvalidPriceInput,
}

pub type MathResult<T> = Result<T, MathError>;
