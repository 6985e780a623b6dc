//! Config, fee tier and fee-rate administration

use tracing::{debug, info};

use super::{OperationOutput, Program};
use crate::error::{AccountKind, CoreResult, YeveswapError};
use crate::events::{
    AuthorityChanged, AuthorityKind, ConfigInitialized, FeeRateChanged, FeeRateTarget,
    FeeTierInitialized, ProtocolFeesCollected,
};
use crate::state::{Address, FeeTier, PoolConfig};
use crate::token::{TokenBatch, TokenService, TransferDirection};

impl<S: TokenService> Program<S> {
    /// Create the deployment's authority record at `config`.
    pub fn initialize_config(
        &mut self,
        config: Address,
        fee_authority: Address,
        collect_protocol_fees_authority: Address,
        reward_emissions_super_authority: Address,
        default_protocol_fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        let record = PoolConfig::new(
            fee_authority,
            collect_protocol_fees_authority,
            reward_emissions_super_authority,
            default_protocol_fee_rate,
        )?;
        self.store.insert_config(config, record)?;

        info!(%config, %fee_authority, default_protocol_fee_rate, "config initialized");
        Ok(OperationOutput::without_transfers(
            (),
            ConfigInitialized {
                config,
                fee_authority,
                collect_protocol_fees_authority,
                reward_emissions_super_authority,
                default_protocol_fee_rate,
            },
        ))
    }

    pub fn initialize_fee_tier(
        &mut self,
        config: Address,
        fee_tier: Address,
        fee_authority: Address,
        tick_spacing: u16,
        default_fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        self.store.config(&config)?.require_fee_authority(&fee_authority)?;
        let record = FeeTier::new(config, tick_spacing, default_fee_rate)?;
        self.store.insert_fee_tier(fee_tier, record)?;

        info!(%config, %fee_tier, tick_spacing, default_fee_rate, "fee tier initialized");
        Ok(OperationOutput::without_transfers(
            (),
            FeeTierInitialized {
                config,
                fee_tier,
                tick_spacing,
                default_fee_rate,
            },
        ))
    }

    // ========================================================================
    // Authority rotation
    // ========================================================================

    pub fn set_fee_authority(
        &mut self,
        config: Address,
        fee_authority: Address,
        new_fee_authority: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.config(&config)?;
        record.require_fee_authority(&fee_authority)?;
        record.update_fee_authority(new_fee_authority);
        self.store.put_config(config, record)?;
        Ok(authority_changed(config, AuthorityKind::Fee, new_fee_authority))
    }

    pub fn set_collect_protocol_fees_authority(
        &mut self,
        config: Address,
        collect_protocol_fees_authority: Address,
        new_authority: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.config(&config)?;
        record.require_collect_protocol_fees_authority(&collect_protocol_fees_authority)?;
        record.update_collect_protocol_fees_authority(new_authority);
        self.store.put_config(config, record)?;
        Ok(authority_changed(
            config,
            AuthorityKind::CollectProtocolFees,
            new_authority,
        ))
    }

    pub fn set_reward_emissions_super_authority(
        &mut self,
        config: Address,
        reward_emissions_super_authority: Address,
        new_authority: Address,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.config(&config)?;
        record.require_reward_emissions_super_authority(&reward_emissions_super_authority)?;
        record.update_reward_emissions_super_authority(new_authority);
        self.store.put_config(config, record)?;
        Ok(authority_changed(
            config,
            AuthorityKind::RewardEmissionsSuper,
            new_authority,
        ))
    }

    // ========================================================================
    // Fee rates
    // ========================================================================

    pub fn set_default_fee_rate(
        &mut self,
        config: Address,
        fee_tier: Address,
        fee_authority: Address,
        default_fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        self.store.config(&config)?.require_fee_authority(&fee_authority)?;
        let mut record = *self.store.fee_tier(&fee_tier)?;
        if record.config != config {
            return Err(YeveswapError::AccountRelationMismatch(AccountKind::FeeTier));
        }
        record.update_default_fee_rate(default_fee_rate)?;
        self.store.put_fee_tier(fee_tier, record)?;

        debug!(%fee_tier, default_fee_rate, "default fee rate set");
        Ok(fee_rate_changed(
            FeeRateTarget::FeeTierDefault { fee_tier },
            default_fee_rate,
        ))
    }

    pub fn set_default_protocol_fee_rate(
        &mut self,
        config: Address,
        fee_authority: Address,
        default_protocol_fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.config(&config)?;
        record.require_fee_authority(&fee_authority)?;
        record.update_default_protocol_fee_rate(default_protocol_fee_rate)?;
        self.store.put_config(config, record)?;

        debug!(%config, default_protocol_fee_rate, "default protocol fee rate set");
        Ok(fee_rate_changed(
            FeeRateTarget::ConfigDefaultProtocol { config },
            default_protocol_fee_rate,
        ))
    }

    pub fn set_fee_rate(
        &mut self,
        pool: Address,
        fee_authority: Address,
        fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.pool(&pool)?;
        self.store
            .config(&record.config)?
            .require_fee_authority(&fee_authority)?;
        record.update_fee_rate(fee_rate)?;
        self.store.put_pool(pool, record)?;

        debug!(%pool, fee_rate, "pool fee rate set");
        Ok(fee_rate_changed(FeeRateTarget::PoolFee { pool }, fee_rate))
    }

    pub fn set_protocol_fee_rate(
        &mut self,
        pool: Address,
        fee_authority: Address,
        protocol_fee_rate: u16,
    ) -> CoreResult<OperationOutput<()>> {
        let mut record = *self.store.pool(&pool)?;
        self.store
            .config(&record.config)?
            .require_fee_authority(&fee_authority)?;
        record.update_protocol_fee_rate(protocol_fee_rate)?;
        self.store.put_pool(pool, record)?;

        debug!(%pool, protocol_fee_rate, "pool protocol fee rate set");
        Ok(fee_rate_changed(
            FeeRateTarget::PoolProtocolFee { pool },
            protocol_fee_rate,
        ))
    }

    /// Pay out the pool's accrued protocol fees. Returns `(amount_a, amount_b)`.
    pub fn collect_protocol_fees(
        &mut self,
        pool: Address,
        collect_protocol_fees_authority: Address,
        recipient_a: Address,
        recipient_b: Address,
    ) -> CoreResult<OperationOutput<(u64, u64)>> {
        let mut record = *self.store.pool(&pool)?;
        self.store
            .config(&record.config)?
            .require_collect_protocol_fees_authority(&collect_protocol_fees_authority)?;

        let amount_a = record.protocol_fee_owed_a;
        let amount_b = record.protocol_fee_owed_b;
        let mut batch = TokenBatch::new();
        batch
            .transfer(
                record.token_mint_a,
                record.token_vault_a,
                recipient_a,
                amount_a,
                TransferDirection::Withdraw,
            )
            .transfer(
                record.token_mint_b,
                record.token_vault_b,
                recipient_b,
                amount_b,
                TransferDirection::Withdraw,
            );
        self.execute_batch(&batch)?;

        record.reset_protocol_fees_owed();
        self.store.put_pool(pool, record)?;

        debug!(%pool, amount_a, amount_b, "protocol fees collected");
        let event = ProtocolFeesCollected {
            pool,
            amount_a,
            amount_b,
        };
        Ok(OperationOutput::new((amount_a, amount_b), batch, vec![event.into()]))
    }
}

pub(super) fn authority_changed(
    config: Address,
    kind: AuthorityKind,
    new_authority: Address,
) -> OperationOutput<()> {
    info!(%config, ?kind, %new_authority, "authority changed");
    OperationOutput::without_transfers(
        (),
        AuthorityChanged {
            config,
            kind,
            new_authority,
        },
    )
}

fn fee_rate_changed(target: FeeRateTarget, rate: u16) -> OperationOutput<()> {
    OperationOutput::without_transfers((), FeeRateChanged { target, rate })
}
