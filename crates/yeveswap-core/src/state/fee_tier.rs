use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::MAX_FEE_RATE;
use crate::error::{CoreResult, YeveswapError};
use crate::state::{Address, Persisted};

/// Tick spacing and default fee rate for pools created under a config.
/// One per (config, tick spacing).
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeTier {
    pub config: Address,
    pub tick_spacing: u16,
    pub default_fee_rate: u16,
}

impl FeeTier {
    // config(32) + tick_spacing(2) + default_fee_rate(2)
    pub const LEN: usize = 32 + 2 + 2;

    pub fn new(config: Address, tick_spacing: u16, default_fee_rate: u16) -> CoreResult<Self> {
        if tick_spacing == 0 {
            return Err(YeveswapError::InvalidTickSpacing);
        }
        let mut fee_tier = Self {
            config,
            tick_spacing,
            default_fee_rate: 0,
        };
        fee_tier.update_default_fee_rate(default_fee_rate)?;
        Ok(fee_tier)
    }

    pub fn update_default_fee_rate(&mut self, default_fee_rate: u16) -> CoreResult<()> {
        if default_fee_rate > MAX_FEE_RATE {
            return Err(YeveswapError::FeeRateMaxExceeded(default_fee_rate));
        }
        self.default_fee_rate = default_fee_rate;
        Ok(())
    }
}

impl Persisted for FeeTier {
    const LEN: usize = FeeTier::LEN;
}
