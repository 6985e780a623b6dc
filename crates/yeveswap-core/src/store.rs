//! Keyed in-memory account state
//!
//! Addresses are chosen by the host. The store enforces uniqueness of each
//! address and of the natural keys the protocol requires: one fee tier per
//! (config, tick spacing) and one pool per [`PoolKey`].

use std::collections::BTreeMap;

use crate::error::{AccountKind, CoreResult, YeveswapError};
use crate::registry::TickArrayRegistry;
use crate::state::{Address, FeeTier, Pool, PoolConfig, PoolKey, Position};

#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    configs: BTreeMap<Address, PoolConfig>,
    fee_tiers: BTreeMap<Address, FeeTier>,
    fee_tier_keys: BTreeMap<(Address, u16), Address>,
    pools: BTreeMap<Address, Pool>,
    pool_keys: BTreeMap<PoolKey, Address>,
    tick_arrays: BTreeMap<Address, TickArrayRegistry>,
    positions: BTreeMap<Address, Position>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Configs
    // ========================================================================

    pub fn config(&self, address: &Address) -> CoreResult<&PoolConfig> {
        self.configs
            .get(address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Config))
    }

    pub fn insert_config(&mut self, address: Address, config: PoolConfig) -> CoreResult<()> {
        if self.configs.contains_key(&address) {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::Config));
        }
        self.configs.insert(address, config);
        Ok(())
    }

    pub fn put_config(&mut self, address: Address, config: PoolConfig) -> CoreResult<()> {
        let slot = self
            .configs
            .get_mut(&address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Config))?;
        *slot = config;
        Ok(())
    }

    // ========================================================================
    // Fee Tiers
    // ========================================================================

    pub fn fee_tier(&self, address: &Address) -> CoreResult<&FeeTier> {
        self.fee_tiers
            .get(address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::FeeTier))
    }

    /// Fee tier registered for `tick_spacing` under `config`, if any.
    pub fn fee_tier_for(&self, config: &Address, tick_spacing: u16) -> Option<Address> {
        self.fee_tier_keys.get(&(*config, tick_spacing)).copied()
    }

    pub fn insert_fee_tier(&mut self, address: Address, fee_tier: FeeTier) -> CoreResult<()> {
        let key = (fee_tier.config, fee_tier.tick_spacing);
        if self.fee_tiers.contains_key(&address) || self.fee_tier_keys.contains_key(&key) {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::FeeTier));
        }
        self.fee_tiers.insert(address, fee_tier);
        self.fee_tier_keys.insert(key, address);
        Ok(())
    }

    pub fn put_fee_tier(&mut self, address: Address, fee_tier: FeeTier) -> CoreResult<()> {
        let slot = self
            .fee_tiers
            .get_mut(&address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::FeeTier))?;
        *slot = fee_tier;
        Ok(())
    }

    // ========================================================================
    // Pools and their tick arrays
    // ========================================================================

    pub fn pool(&self, address: &Address) -> CoreResult<&Pool> {
        self.pools
            .get(address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Pool))
    }

    pub fn pool_for(&self, key: &PoolKey) -> Option<Address> {
        self.pool_keys.get(key).copied()
    }

    pub fn pools(&self) -> impl Iterator<Item = (&Address, &Pool)> {
        self.pools.iter()
    }

    /// Register a new pool together with its empty tick array registry.
    pub fn insert_pool(&mut self, address: Address, pool: Pool) -> CoreResult<()> {
        let key = pool.key();
        if self.pools.contains_key(&address) || self.pool_keys.contains_key(&key) {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::Pool));
        }
        self.tick_arrays
            .insert(address, TickArrayRegistry::new(address, pool.tick_spacing));
        self.pool_keys.insert(key, address);
        self.pools.insert(address, pool);
        Ok(())
    }

    pub fn put_pool(&mut self, address: Address, pool: Pool) -> CoreResult<()> {
        let slot = self
            .pools
            .get_mut(&address)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Pool))?;
        *slot = pool;
        Ok(())
    }

    pub fn tick_arrays(&self, pool: &Address) -> CoreResult<&TickArrayRegistry> {
        self.tick_arrays
            .get(pool)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Pool))
    }

    pub fn tick_arrays_mut(&mut self, pool: &Address) -> CoreResult<&mut TickArrayRegistry> {
        self.tick_arrays
            .get_mut(pool)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Pool))
    }

    // ========================================================================
    // Positions
    // ========================================================================

    pub fn position(&self, position_mint: &Address) -> CoreResult<&Position> {
        self.positions
            .get(position_mint)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Position))
    }

    pub fn positions_in_pool<'a>(
        &'a self,
        pool: &'a Address,
    ) -> impl Iterator<Item = &'a Position> + 'a {
        self.positions
            .values()
            .filter(move |position| position.pool == *pool)
    }

    pub fn insert_position(&mut self, position: Position) -> CoreResult<()> {
        if self.positions.contains_key(&position.position_mint) {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::Position));
        }
        self.positions.insert(position.position_mint, position);
        Ok(())
    }

    pub fn put_position(&mut self, position: Position) -> CoreResult<()> {
        let slot = self
            .positions
            .get_mut(&position.position_mint)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Position))?;
        *slot = position;
        Ok(())
    }

    pub fn remove_position(&mut self, position_mint: &Address) -> CoreResult<Position> {
        self.positions
            .remove(position_mint)
            .ok_or(YeveswapError::AccountNotFound(AccountKind::Position))
    }
}
