use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::MAX_PROTOCOL_FEE_RATE;
use crate::error::{AuthorityRole, CoreResult, YeveswapError};
use crate::state::{Address, Persisted};

/// Deployment-wide authority roles and protocol fee default.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolConfig {
    pub fee_authority: Address,
    pub collect_protocol_fees_authority: Address,
    pub reward_emissions_super_authority: Address,
    pub default_protocol_fee_rate: u16,
}

impl PoolConfig {
    // fee_authority(32) + collect_protocol_fees_authority(32) + reward_emissions_super_authority(32) + default_protocol_fee_rate(2)
    pub const LEN: usize = 32 + 32 + 32 + 2;

    pub fn new(
        fee_authority: Address,
        collect_protocol_fees_authority: Address,
        reward_emissions_super_authority: Address,
        default_protocol_fee_rate: u16,
    ) -> CoreResult<Self> {
        let mut config = Self {
            fee_authority,
            collect_protocol_fees_authority,
            reward_emissions_super_authority,
            default_protocol_fee_rate: 0,
        };
        config.update_default_protocol_fee_rate(default_protocol_fee_rate)?;
        Ok(config)
    }

    pub fn require_fee_authority(&self, claimed: &Address) -> CoreResult<()> {
        require_authority(&self.fee_authority, claimed, AuthorityRole::Fee)
    }

    pub fn require_collect_protocol_fees_authority(&self, claimed: &Address) -> CoreResult<()> {
        require_authority(
            &self.collect_protocol_fees_authority,
            claimed,
            AuthorityRole::CollectProtocolFees,
        )
    }

    pub fn require_reward_emissions_super_authority(&self, claimed: &Address) -> CoreResult<()> {
        require_authority(
            &self.reward_emissions_super_authority,
            claimed,
            AuthorityRole::RewardEmissionsSuper,
        )
    }

    pub fn update_fee_authority(&mut self, fee_authority: Address) {
        self.fee_authority = fee_authority;
    }

    pub fn update_collect_protocol_fees_authority(&mut self, authority: Address) {
        self.collect_protocol_fees_authority = authority;
    }

    pub fn update_reward_emissions_super_authority(&mut self, authority: Address) {
        self.reward_emissions_super_authority = authority;
    }

    pub fn update_default_protocol_fee_rate(&mut self, rate: u16) -> CoreResult<()> {
        if rate > MAX_PROTOCOL_FEE_RATE {
            return Err(YeveswapError::ProtocolFeeRateMaxExceeded(rate));
        }
        self.default_protocol_fee_rate = rate;
        Ok(())
    }
}

impl Persisted for PoolConfig {
    const LEN: usize = PoolConfig::LEN;
}

pub(crate) fn require_authority(
    expected: &Address,
    claimed: &Address,
    role: AuthorityRole,
) -> CoreResult<()> {
    if expected != claimed {
        return Err(YeveswapError::unauthorized(role, claimed));
    }
    Ok(())
}
