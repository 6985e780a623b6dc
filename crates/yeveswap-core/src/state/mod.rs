//! Persisted account records

pub mod address;
pub mod config;
pub mod fee_tier;
pub mod layout;
pub mod pool;
pub mod position;
pub mod tick;

pub use address::Address;
pub use config::PoolConfig;
pub use fee_tier::FeeTier;
pub use layout::Persisted;
pub use pool::{growth_globals_with_rewards, Pool, PoolInit, PoolKey, RewardInfo};
pub use position::{Position, PositionRewardInfo};
pub use tick::{
    is_valid_start_tick_index, start_tick_index_for, GrowthSnapshot, Tick, TickArray,
};
