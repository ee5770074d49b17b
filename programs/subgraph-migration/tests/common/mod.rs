#![allow(dead_code)]

use std::sync::Once;

use subgraph_migration::{
    message::{receive_curator_balance, receive_subgraph},
    types::{Address, H256, U256},
    CallContext, CurationConfig, DeploymentId, GatewayConfig, LocalCuration, LocalGraphToken,
    MigrationConfig, MigrationResult, MigrationStateMachine, SubgraphId, TokenGateway,
};
use subgraph_migration::state::DEFAULT_RESERVE_RATIO;

pub type Machine = MigrationStateMachine<LocalCuration, LocalGraphToken>;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn registry() -> Address {
    Address::from_low_u64_be(0x1001)
}

pub fn gateway_address() -> Address {
    Address::from_low_u64_be(0x1002)
}

pub fn l1_registry() -> Address {
    Address::from_low_u64_be(0x1003)
}

pub fn curation_address() -> Address {
    Address::from_low_u64_be(0x1004)
}

pub fn l1_gateway() -> Address {
    Address::from_low_u64_be(0x2001)
}

pub fn l1_grt() -> Address {
    Address::from_low_u64_be(0x2002)
}

pub fn alice() -> Address {
    Address::from_low_u64_be(0xa11ce)
}

pub fn bob() -> Address {
    Address::from_low_u64_be(0xb0b)
}

pub fn deployment(n: u8) -> DeploymentId {
    DeploymentId::from([n; 32])
}

pub fn metadata(n: u8) -> H256 {
    H256::repeat_byte(n)
}

pub fn migration_config() -> MigrationConfig {
    MigrationConfig {
        registry: registry(),
        gateway: gateway_address(),
        l1_counterpart: l1_registry(),
        curation: curation_address(),
        fixed_reserve_ratio: DEFAULT_RESERVE_RATIO,
        chain_id: 42161,
    }
}

pub fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        address: gateway_address(),
        l1_counterpart: l1_gateway(),
        l1_token: l1_grt(),
    }
}

/// State machine wired to a gateway, as deployed on L2.
pub struct Harness {
    pub sm: Machine,
    pub gateway: TokenGateway,
    pub block: u64,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            sm: MigrationStateMachine::new(
                migration_config(),
                LocalCuration::new(&CurationConfig::default()),
                LocalGraphToken::new(),
            ),
            gateway: TokenGateway::new(gateway_config()),
            block: 100,
        }
    }

    pub fn relayer(&self) -> CallContext {
        CallContext::new(self.gateway.l1_counterpart_alias(), self.block)
    }

    /// Relays a deposit from the L1 registry to the L2 registry with `data`.
    pub fn gateway_finalize_transfer(&mut self, amount: u128, data: &[u8]) -> MigrationResult<()> {
        self.block += 1;
        let relayer = self.relayer();
        self.gateway.finalize_inbound_transfer(
            &mut self.sm,
            &relayer,
            l1_grt(),
            l1_registry(),
            registry(),
            U256::from(amount),
            data,
        )
    }

    pub fn send_subgraph(
        &mut self,
        l1_id: SubgraphId,
        beneficiary: Address,
        amount: u128,
    ) -> MigrationResult<()> {
        self.gateway_finalize_transfer(amount, &receive_subgraph(l1_id, beneficiary))
    }

    pub fn send_curator_balance(
        &mut self,
        l1_id: SubgraphId,
        curator: Address,
        amount: u128,
    ) -> MigrationResult<()> {
        self.gateway_finalize_transfer(amount, &receive_curator_balance(l1_id, curator))
    }

    pub fn finish(&mut self, owner: Address, l2_id: SubgraphId, deployment_id: DeploymentId) -> MigrationResult<()> {
        self.block += 1;
        let ctx = CallContext::new(owner, self.block);
        self.sm
            .finish_transfer_from_l1(&ctx, l2_id, deployment_id, metadata(1), metadata(2))
    }

    pub fn ctx(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.block)
    }
}
