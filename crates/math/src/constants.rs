//! # Math Constants
//!
//! Domain bounds for ticks and Q64.64 square-root prices, plus the fee-rate
//! denominators shared by swap and fee computations.

/// 2^64, the Q64.64 unit.
pub const Q64: u128 = 1 << 64;
pub const Q64_RESOLUTION: u32 = 64;

pub const MIN_TICK_INDEX: i32 = -443_636;
pub const MAX_TICK_INDEX: i32 = 443_636;

/// sqrt(1.0001^MIN_TICK_INDEX) in Q64.64.
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;
/// sqrt(1.0001^MAX_TICK_INDEX) in Q64.64.
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

/// Fee rates are hundredths of a basis point.
pub const FEE_RATE_MUL_VALUE: u128 = 1_000_000;
/// Protocol fee rates are basis points of the swap fee.
pub const PROTOCOL_FEE_RATE_MUL_VALUE: u128 = 10_000;
