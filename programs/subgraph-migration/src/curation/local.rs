use std::collections::HashMap;

use tracing::debug;

use crate::{
    config::CurationConfig,
    curation::Curation,
    error::{MigrationError, MigrationResult},
    math::{checked_add, checked_sub, mul_div, ppm_of, MAX_PPM},
    types::DeploymentId,
};

/// Signal received for the minimum deposit into an empty pool (1e-18).
pub const SIGNAL_PER_MINIMUM_DEPOSIT: u128 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurationPool {
    pub tokens: u128,
    pub signal: u128,
}

/// Linear (100% reserve ratio) curation with in-memory pools.
#[derive(Debug, Clone)]
pub struct LocalCuration {
    minimum_curation_deposit: u128,
    curation_tax_percentage: u32,
    pools: HashMap<DeploymentId, CurationPool>,
}

impl LocalCuration {
    pub fn new(config: &CurationConfig) -> Self {
        Self {
            minimum_curation_deposit: config.minimum_curation_deposit,
            curation_tax_percentage: config.curation_tax_percentage,
            pools: HashMap::new(),
        }
    }

    pub fn set_curation_tax_percentage(&mut self, ppm: u32) -> MigrationResult<()> {
        if ppm > MAX_PPM {
            return Err(MigrationError::InvalidConfig);
        }
        self.curation_tax_percentage = ppm;
        Ok(())
    }

    pub fn pool(&self, deployment: &DeploymentId) -> CurationPool {
        self.pools.get(deployment).copied().unwrap_or_default()
    }

    fn deposit(&mut self, deployment: &DeploymentId, tokens: u128, signal: u128) -> MigrationResult<()> {
        let pool = self.pool(deployment);
        let updated = CurationPool {
            tokens: checked_add(pool.tokens, tokens)?,
            signal: checked_add(pool.signal, signal)?,
        };
        self.pools.insert(*deployment, updated);
        debug!(
            deployment = ?deployment,
            tokens,
            signal,
            pool_tokens = updated.tokens,
            pool_signal = updated.signal,
            "curation: deposit"
        );
        Ok(())
    }
}

impl Curation for LocalCuration {
    fn minimum_curation_deposit(&self) -> u128 {
        self.minimum_curation_deposit
    }

    fn tokens_to_signal(&self, deployment: &DeploymentId, tokens: u128)
        -> MigrationResult<(u128, u128)> {
        let tax = ppm_of(tokens, self.curation_tax_percentage)?;
        let signal = self.tokens_to_signal_no_tax(deployment, checked_sub(tokens, tax)?)?;
        Ok((signal, tax))
    }

    fn tokens_to_signal_no_tax(&self, deployment: &DeploymentId, tokens: u128)
        -> MigrationResult<u128> {
        let pool = self.pool(deployment);

        // First deposit initializes the pool at a fixed price
        if pool.tokens == 0 {
            if tokens < self.minimum_curation_deposit {
                return Err(MigrationError::BelowMinimumDeposit);
            }
            let excess = mul_div(
                SIGNAL_PER_MINIMUM_DEPOSIT,
                tokens - self.minimum_curation_deposit,
                self.minimum_curation_deposit,
            )?;
            return checked_add(SIGNAL_PER_MINIMUM_DEPOSIT, excess);
        }

        mul_div(pool.signal, tokens, pool.tokens)
    }

    fn mint(
        &mut self,
        deployment: &DeploymentId,
        tokens: u128,
        min_signal: u128,
    ) -> MigrationResult<(u128, u128)> {
        if tokens == 0 {
            return Err(MigrationError::ZeroTokens);
        }
        let (signal, tax) = self.tokens_to_signal(deployment, tokens)?;
        if signal < min_signal {
            return Err(MigrationError::SlippageProtection);
        }
        self.deposit(deployment, checked_sub(tokens, tax)?, signal)?;
        Ok((signal, tax))
    }

    fn mint_tax_free(&mut self, deployment: &DeploymentId, tokens: u128) -> MigrationResult<u128> {
        if tokens == 0 {
            return Err(MigrationError::ZeroTokens);
        }
        let signal = self.tokens_to_signal_no_tax(deployment, tokens)?;
        self.deposit(deployment, tokens, signal)?;
        Ok(signal)
    }

    fn burn(
        &mut self,
        deployment: &DeploymentId,
        signal: u128,
        min_tokens: u128,
    ) -> MigrationResult<u128> {
        if signal == 0 {
            return Err(MigrationError::ZeroTokens);
        }
        let pool = self.pool(deployment);
        if signal > pool.signal {
            return Err(MigrationError::InsufficientBalance);
        }
        let tokens = mul_div(pool.tokens, signal, pool.signal)?;
        if tokens < min_tokens {
            return Err(MigrationError::SlippageProtection);
        }
        let remaining = CurationPool {
            tokens: checked_sub(pool.tokens, tokens)?,
            signal: pool.signal - signal,
        };
        if remaining.signal == 0 {
            self.pools.remove(deployment);
        } else {
            self.pools.insert(*deployment, remaining);
        }
        Ok(tokens)
    }

    fn get_curation_pool_tokens(&self, deployment: &DeploymentId) -> u128 {
        self.pool(deployment).tokens
    }

    fn get_curation_pool_signal(&self, deployment: &DeploymentId) -> u128 {
        self.pool(deployment).signal
    }
}
