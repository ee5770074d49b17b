//! Event log for off-chain observers.
//!
//! Every notification carries a stable type discriminator and is logged with
//! its ABI-encoded body, the layout indexers already decode for the L1 side.

use ethereum_types::{Address, H256, U256};
use tracing::info;

use crate::{
    message::{encode_address, encode_uint, WORD_LEN},
    types::{DeploymentId, SubgraphId},
};

/// Event type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    // Migration events
    SubgraphReceivedFromL1 = 1,
    CuratorBalanceReceived = 2,
    CuratorBalanceReturnedToBeneficiary = 3,
    SubgraphL2TransferFinalized = 4,

    // Publication events
    SubgraphPublished = 10,
    SubgraphMetadataUpdated = 11,
    SubgraphUpgraded = 12,
    SubgraphVersionUpdated = 13,
    SubgraphDeprecated = 14,

    // Signal events
    SignalMinted = 20,

    // Gateway events
    DepositFinalized = 30,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    SubgraphReceivedFromL1 {
        l1_subgraph_id: SubgraphId,
        l2_subgraph_id: SubgraphId,
        owner: Address,
        tokens: u128,
    },
    CuratorBalanceReceived {
        l1_subgraph_id: SubgraphId,
        l2_subgraph_id: SubgraphId,
        curator: Address,
        tokens: u128,
    },
    CuratorBalanceReturnedToBeneficiary {
        l1_subgraph_id: SubgraphId,
        curator: Address,
        tokens: u128,
    },
    SubgraphL2TransferFinalized {
        l2_subgraph_id: SubgraphId,
    },
    SubgraphPublished {
        subgraph_id: SubgraphId,
        deployment_id: DeploymentId,
        reserve_ratio: u32,
    },
    SubgraphMetadataUpdated {
        subgraph_id: SubgraphId,
        metadata: H256,
    },
    SubgraphUpgraded {
        subgraph_id: SubgraphId,
        v_signal: u128,
        tokens: u128,
        deployment_id: DeploymentId,
    },
    SubgraphVersionUpdated {
        subgraph_id: SubgraphId,
        deployment_id: DeploymentId,
        version_metadata: H256,
    },
    SubgraphDeprecated {
        subgraph_id: SubgraphId,
        withdrawable_tokens: u128,
    },
    SignalMinted {
        subgraph_id: SubgraphId,
        curator: Address,
        n_signal: u128,
        v_signal: u128,
        tokens: u128,
    },
    DepositFinalized {
        l1_token: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
}

impl MigrationEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::SubgraphReceivedFromL1 { .. } => EventType::SubgraphReceivedFromL1,
            Self::CuratorBalanceReceived { .. } => EventType::CuratorBalanceReceived,
            Self::CuratorBalanceReturnedToBeneficiary { .. } => {
                EventType::CuratorBalanceReturnedToBeneficiary
            }
            Self::SubgraphL2TransferFinalized { .. } => EventType::SubgraphL2TransferFinalized,
            Self::SubgraphPublished { .. } => EventType::SubgraphPublished,
            Self::SubgraphMetadataUpdated { .. } => EventType::SubgraphMetadataUpdated,
            Self::SubgraphUpgraded { .. } => EventType::SubgraphUpgraded,
            Self::SubgraphVersionUpdated { .. } => EventType::SubgraphVersionUpdated,
            Self::SubgraphDeprecated { .. } => EventType::SubgraphDeprecated,
            Self::SignalMinted { .. } => EventType::SignalMinted,
            Self::DepositFinalized { .. } => EventType::DepositFinalized,
        }
    }

    /// Event arguments as consecutive 32-byte ABI words.
    pub fn encode_data(&self) -> Vec<u8> {
        let words: Vec<[u8; WORD_LEN]> = match self {
            Self::SubgraphReceivedFromL1 {
                l1_subgraph_id,
                l2_subgraph_id,
                owner,
                tokens,
            } => vec![
                l1_subgraph_id.to_be_bytes(),
                l2_subgraph_id.to_be_bytes(),
                encode_address(owner),
                amount_word(*tokens),
            ],
            Self::CuratorBalanceReceived {
                l1_subgraph_id,
                l2_subgraph_id,
                curator,
                tokens,
            } => vec![
                l1_subgraph_id.to_be_bytes(),
                l2_subgraph_id.to_be_bytes(),
                encode_address(curator),
                amount_word(*tokens),
            ],
            Self::CuratorBalanceReturnedToBeneficiary {
                l1_subgraph_id,
                curator,
                tokens,
            } => vec![
                l1_subgraph_id.to_be_bytes(),
                encode_address(curator),
                amount_word(*tokens),
            ],
            Self::SubgraphL2TransferFinalized { l2_subgraph_id } => {
                vec![l2_subgraph_id.to_be_bytes()]
            }
            Self::SubgraphPublished {
                subgraph_id,
                deployment_id,
                reserve_ratio,
            } => vec![
                subgraph_id.to_be_bytes(),
                deployment_id.0.to_fixed_bytes(),
                encode_uint(U256::from(*reserve_ratio)),
            ],
            Self::SubgraphMetadataUpdated {
                subgraph_id,
                metadata,
            } => vec![subgraph_id.to_be_bytes(), metadata.to_fixed_bytes()],
            Self::SubgraphUpgraded {
                subgraph_id,
                v_signal,
                tokens,
                deployment_id,
            } => vec![
                subgraph_id.to_be_bytes(),
                amount_word(*v_signal),
                amount_word(*tokens),
                deployment_id.0.to_fixed_bytes(),
            ],
            Self::SubgraphVersionUpdated {
                subgraph_id,
                deployment_id,
                version_metadata,
            } => vec![
                subgraph_id.to_be_bytes(),
                deployment_id.0.to_fixed_bytes(),
                version_metadata.to_fixed_bytes(),
            ],
            Self::SubgraphDeprecated {
                subgraph_id,
                withdrawable_tokens,
            } => vec![subgraph_id.to_be_bytes(), amount_word(*withdrawable_tokens)],
            Self::SignalMinted {
                subgraph_id,
                curator,
                n_signal,
                v_signal,
                tokens,
            } => vec![
                subgraph_id.to_be_bytes(),
                encode_address(curator),
                amount_word(*n_signal),
                amount_word(*v_signal),
                amount_word(*tokens),
            ],
            Self::DepositFinalized {
                l1_token,
                from,
                to,
                amount,
            } => vec![
                encode_address(l1_token),
                encode_address(from),
                encode_address(to),
                amount_word(*amount),
            ],
        };
        words.concat()
    }
}

fn amount_word(amount: u128) -> [u8; WORD_LEN] {
    encode_uint(U256::from(amount))
}

/// Append-only, in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<MigrationEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MigrationEvent) {
        info!(
            event_type = ?event.event_type(),
            data = %hex::encode(event.encode_data()),
            "SUBGRAPH_MIGRATION_EVENT"
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[MigrationEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events emitted after position `mark`.
    pub fn since(&self, mark: usize) -> &[MigrationEvent] {
        &self.events[mark.min(self.events.len())..]
    }

    /// Drops everything emitted after `mark`. Used when a call is reverted.
    pub fn truncate(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    pub fn types_since(&self, mark: usize) -> Vec<EventType> {
        self.since(mark).iter().map(MigrationEvent::event_type).collect()
    }
}
