//! Reference L2 token gateway.
//!
//! Relays a finalized deposit from L1: mints the bridged GRT to the
//! recipient, then invokes the recipient's callhook when the deposit carries
//! data. The whole relay is one transition, so a failing callhook also
//! reverts the mint.

use ethereum_types::{Address, U256};
use tracing::info;

use crate::{
    alias::apply_l1_to_l2_alias,
    config::GatewayConfig,
    curation::Curation,
    error::{MigrationError, MigrationResult},
    events::MigrationEvent,
    math::u256_to_amount,
    processor::MigrationStateMachine,
    token::GraphToken,
    types::CallContext,
};

/// Contracts that accept tokens together with a message from L1.
pub trait CallhookReceiver {
    fn on_token_transfer(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
        data: &[u8],
    ) -> MigrationResult<()>;
}

impl<C, T> CallhookReceiver for MigrationStateMachine<C, T>
where
    C: Curation + Clone,
    T: GraphToken + Clone,
{
    fn on_token_transfer(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
        data: &[u8],
    ) -> MigrationResult<()> {
        self.on_incoming_transfer(ctx, from, to, amount, data)
    }
}

#[derive(Debug, Clone)]
pub struct TokenGateway {
    config: GatewayConfig,
}

impl TokenGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    /// Address the L1 gateway's messages arrive from on L2.
    pub fn l1_counterpart_alias(&self) -> Address {
        apply_l1_to_l2_alias(&self.config.l1_counterpart)
    }

    /// `ctx.caller` is the message relayer and must be the aliased L1
    /// gateway. `amount` arrives as a 256-bit word and must fit an amount.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize_inbound_transfer<C, T>(
        &self,
        sm: &mut MigrationStateMachine<C, T>,
        ctx: &CallContext,
        l1_token: Address,
        from: Address,
        to: Address,
        amount: U256,
        data: &[u8],
    ) -> MigrationResult<()>
    where
        C: Curation + Clone,
        T: GraphToken + Clone,
    {
        if ctx.caller != self.l1_counterpart_alias() {
            return Err(MigrationError::NotGateway);
        }
        if l1_token != self.config.l1_token {
            return Err(MigrationError::UnknownToken);
        }
        let amount = u256_to_amount(amount)?;

        let gateway_ctx = CallContext::new(self.config.address, ctx.block_number);
        sm.transact(|sm| {
            sm.token_mut().mint(&to, amount)?;
            if !data.is_empty() {
                sm.on_token_transfer(&gateway_ctx, from, to, amount, data)?;
            }
            info!(from = ?from, to = ?to, amount, "Deposit finalized");
            sm.emit(MigrationEvent::DepositFinalized {
                l1_token,
                from,
                to,
                amount,
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CurationConfig, MigrationConfig},
        curation::LocalCuration,
        message::receive_subgraph,
        state::DEFAULT_RESERVE_RATIO,
        token::LocalGraphToken,
        types::{grt, SubgraphId},
    };

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            address: Address::from_low_u64_be(0x200),
            l1_counterpart: Address::from_low_u64_be(0x500),
            l1_token: Address::from_low_u64_be(0x600),
        }
    }

    fn machine() -> MigrationStateMachine<LocalCuration, LocalGraphToken> {
        let config = MigrationConfig {
            registry: Address::from_low_u64_be(0x100),
            gateway: Address::from_low_u64_be(0x200),
            l1_counterpart: Address::from_low_u64_be(0x300),
            curation: Address::from_low_u64_be(0x400),
            fixed_reserve_ratio: DEFAULT_RESERVE_RATIO,
            chain_id: 42161,
        };
        MigrationStateMachine::new(
            config,
            LocalCuration::new(&CurationConfig::default()),
            LocalGraphToken::new(),
        )
    }

    #[test]
    fn plain_deposit_mints_without_callhook() {
        let gateway = TokenGateway::new(gateway_config());
        let mut sm = machine();
        let ctx = CallContext::new(gateway.l1_counterpart_alias(), 1);
        let alice = Address::from_low_u64_be(0xa11ce);
        gateway
            .finalize_inbound_transfer(
                &mut sm,
                &ctx,
                gateway_config().l1_token,
                alice,
                alice,
                U256::from(grt(5)),
                &[],
            )
            .unwrap();
        assert_eq!(sm.token().balance_of(&alice), grt(5));
        assert_eq!(sm.events().len(), 1);
    }

    #[test]
    fn rejects_unaliased_relayer_and_foreign_token() {
        let gateway = TokenGateway::new(gateway_config());
        let mut sm = machine();
        let alice = Address::from_low_u64_be(0xa11ce);
        let raw = CallContext::new(gateway_config().l1_counterpart, 1);
        assert_eq!(
            gateway.finalize_inbound_transfer(
                &mut sm, &raw, gateway_config().l1_token, alice, alice, U256::one(), &[]
            ),
            Err(MigrationError::NotGateway)
        );
        let relayer = CallContext::new(gateway.l1_counterpart_alias(), 1);
        assert_eq!(
            gateway.finalize_inbound_transfer(
                &mut sm, &relayer, alice, alice, alice, U256::one(), &[]
            ),
            Err(MigrationError::UnknownToken)
        );
        assert_eq!(
            gateway.finalize_inbound_transfer(
                &mut sm, &relayer, gateway_config().l1_token, alice, alice, U256::MAX, &[]
            ),
            Err(MigrationError::AmountOverflow)
        );
    }

    #[test]
    fn failing_callhook_reverts_mint() {
        let gateway = TokenGateway::new(gateway_config());
        let mut sm = machine();
        let relayer = CallContext::new(gateway.l1_counterpart_alias(), 1);
        let registry = sm.config().registry;
        // Sender is not the L1 registry
        let stranger = Address::from_low_u64_be(0xdead);
        let data = receive_subgraph(SubgraphId::from(1u64), stranger);
        assert_eq!(
            gateway.finalize_inbound_transfer(
                &mut sm,
                &relayer,
                gateway_config().l1_token,
                stranger,
                registry,
                U256::from(grt(10)),
                &data,
            ),
            Err(MigrationError::NotL1Peer)
        );
        assert_eq!(sm.token().balance_of(&registry), 0);
        assert_eq!(sm.token().total_supply(), 0);
        assert!(sm.events().is_empty());
    }
}
