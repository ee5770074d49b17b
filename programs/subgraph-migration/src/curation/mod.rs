//! Curation pools the migrated deposits are minted into.
//!
//! The state machine only talks to the [`Curation`] trait; [`LocalCuration`]
//! prices signal the way the L2 curation contract does and keeps the pools
//! in memory.

pub mod local;

pub use local::*;

use crate::{error::MigrationResult, types::DeploymentId};

/// Curation boundary. Amounts are GRT wei, signal is in signal wei.
///
/// Token custody is not handled here: callers move the deposited tokens to
/// the curation address through the token ledger before minting.
pub trait Curation {
    fn minimum_curation_deposit(&self) -> u128;

    /// Signal received for `tokens`, and the tax charged, without minting.
    fn tokens_to_signal(&self, deployment: &DeploymentId, tokens: u128)
        -> MigrationResult<(u128, u128)>;

    fn tokens_to_signal_no_tax(&self, deployment: &DeploymentId, tokens: u128)
        -> MigrationResult<u128>;

    /// Deposit `tokens`, charging curation tax. Returns `(signal, tax)`.
    fn mint(
        &mut self,
        deployment: &DeploymentId,
        tokens: u128,
        min_signal: u128,
    ) -> MigrationResult<(u128, u128)>;

    /// Deposit without tax; reserved for the migration flow.
    fn mint_tax_free(&mut self, deployment: &DeploymentId, tokens: u128) -> MigrationResult<u128>;

    /// Returns the tokens released for `signal`.
    fn burn(
        &mut self,
        deployment: &DeploymentId,
        signal: u128,
        min_tokens: u128,
    ) -> MigrationResult<u128>;

    fn get_curation_pool_tokens(&self, deployment: &DeploymentId) -> u128;

    fn get_curation_pool_signal(&self, deployment: &DeploymentId) -> u128;
}
