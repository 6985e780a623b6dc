//! Protocol constants

pub use yeveswap_math::constants::{
    FEE_RATE_MUL_VALUE, MAX_SQRT_PRICE_X64, MAX_TICK_INDEX, MIN_SQRT_PRICE_X64, MIN_TICK_INDEX,
    PROTOCOL_FEE_RATE_MUL_VALUE, Q64,
};

/// Ticks per tick array page
pub const TICK_ARRAY_SIZE: i32 = 88;
pub const TICK_ARRAY_SIZE_USIZE: usize = 88;

/// Reward slots per pool
pub const NUM_REWARDS: usize = 3;

/// 3% in hundredths of a basis point
pub const MAX_FEE_RATE: u16 = 30_000;
/// 25% of the swap fee, in basis points
pub const MAX_PROTOCOL_FEE_RATE: u16 = 2_500;

pub const DAY_IN_SECONDS: u64 = 86_400;
