use yeveswap_math::Q64;

pub const STABLE_TICK_SPACING: u16 = 1;
pub const MEDIUM_TICK_SPACING: u16 = 64;
pub const HIGH_TICK_SPACING: u16 = 128;

// Hundredths of a basis point
pub const STABLE_FEE_RATE: u16 = 100;
pub const MEDIUM_FEE_RATE: u16 = 3_000;
pub const HIGH_FEE_RATE: u16 = 10_000;

// Basis points of the swap fee
pub const DEFAULT_PROTOCOL_FEE_RATE: u16 = 300;

/// Price 1.0
pub const PRICE_ONE_SQRT_X64: u128 = Q64;

/// Starting balance handed to every funded test account
pub const FUNDING_AMOUNT: u64 = 1_000_000_000_000_000;
