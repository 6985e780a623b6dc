//! Event definitions
//!
//! Each successful operation returns the events it produced alongside its
//! token instructions. Events are borsh-encodable for hosts that log them.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::state::Address;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigInitialized {
    pub config: Address,
    pub fee_authority: Address,
    pub collect_protocol_fees_authority: Address,
    pub reward_emissions_super_authority: Address,
    pub default_protocol_fee_rate: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeTierInitialized {
    pub config: Address,
    pub fee_tier: Address,
    pub tick_spacing: u16,
    pub default_fee_rate: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolInitialized {
    pub pool: Address,
    pub config: Address,
    pub token_mint_a: Address,
    pub token_mint_b: Address,
    pub tick_spacing: u16,
    pub fee_rate: u16,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArrayInitialized {
    pub pool: Address,
    pub start_tick_index: i32,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardInitialized {
    pub pool: Address,
    pub reward_index: u8,
    pub mint: Address,
    pub vault: Address,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardEmissionsSet {
    pub pool: Address,
    pub reward_index: u8,
    pub emissions_per_second_x64: u128,
    pub timestamp: u64,
}

/// Which privileged role changed hands
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityKind {
    Fee,
    CollectProtocolFees,
    RewardEmissionsSuper,
    Reward { pool: Address, reward_index: u8 },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorityChanged {
    pub config: Address,
    pub kind: AuthorityKind,
    pub new_authority: Address,
}

/// A fee tier default, a config default, or a single pool's rate changed
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeRateTarget {
    FeeTierDefault { fee_tier: Address },
    ConfigDefaultProtocol { config: Address },
    PoolFee { pool: Address },
    PoolProtocolFee { pool: Address },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeRateChanged {
    pub target: FeeRateTarget,
    pub rate: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PositionOpened {
    pub pool: Address,
    pub position_mint: Address,
    pub owner: Address,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PositionClosed {
    pub pool: Address,
    pub position_mint: Address,
    pub owner: Address,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct LiquidityChanged {
    pub pool: Address,
    pub position_mint: Address,
    /// Positive for deposits, negative for withdrawals
    pub liquidity_delta: i128,
    pub amount_a: u64,
    pub amount_b: u64,
    pub pool_liquidity: u128,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeesCollected {
    pub pool: Address,
    pub position_mint: Address,
    pub amount_a: u64,
    pub amount_b: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardCollected {
    pub pool: Address,
    pub position_mint: Address,
    pub reward_index: u8,
    pub amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFeesCollected {
    pub pool: Address,
    pub amount_a: u64,
    pub amount_b: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Swapped {
    pub pool: Address,
    pub a_to_b: bool,
    pub amount_in: u64,
    pub amount_out: u64,
    pub protocol_fee: u64,
    pub sqrt_price_before: u128,
    pub sqrt_price_after: u128,
    pub tick_index_after: i32,
    pub liquidity_after: u128,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ConfigInitialized(ConfigInitialized),
    FeeTierInitialized(FeeTierInitialized),
    PoolInitialized(PoolInitialized),
    TickArrayInitialized(TickArrayInitialized),
    RewardInitialized(RewardInitialized),
    RewardEmissionsSet(RewardEmissionsSet),
    AuthorityChanged(AuthorityChanged),
    FeeRateChanged(FeeRateChanged),
    PositionOpened(PositionOpened),
    PositionClosed(PositionClosed),
    LiquidityChanged(LiquidityChanged),
    FeesCollected(FeesCollected),
    RewardCollected(RewardCollected),
    ProtocolFeesCollected(ProtocolFeesCollected),
    Swapped(Swapped),
}

macro_rules! impl_from_event {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Event {
                fn from(event: $variant) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    ConfigInitialized,
    FeeTierInitialized,
    PoolInitialized,
    TickArrayInitialized,
    RewardInitialized,
    RewardEmissionsSet,
    AuthorityChanged,
    FeeRateChanged,
    PositionOpened,
    PositionClosed,
    LiquidityChanged,
    FeesCollected,
    RewardCollected,
    ProtocolFeesCollected,
    Swapped,
);
