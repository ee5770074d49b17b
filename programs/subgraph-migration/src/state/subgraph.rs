use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::DeploymentId;

/// 100% in parts per million. L2 curation no longer uses a bonding curve,
/// every subgraph records the same ratio.
pub const DEFAULT_RESERVE_RATIO: u32 = 1_000_000;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubgraphRecord {
    pub deployment_id: DeploymentId,
    /// Signal held in the deployment's curation pool
    pub v_signal: u128,
    /// Signal shown to curators of this subgraph
    pub n_signal: u128,
    pub reserve_ratio: u32,
    pub disabled: bool,
    /// Non-zero only after deprecation
    pub withdrawable_tokens: u128,
}

impl SubgraphRecord {
    pub const LEN: usize = 32 + 16 + 16 + 4 + 1 + 16;

    /// Placeholder created when a subgraph arrives from L1.
    pub fn shell() -> Self {
        Self {
            deployment_id: DeploymentId::ZERO,
            v_signal: 0,
            n_signal: 0,
            reserve_ratio: DEFAULT_RESERVE_RATIO,
            disabled: true,
            withdrawable_tokens: 0,
        }
    }

    pub fn published(deployment_id: DeploymentId) -> Self {
        Self {
            deployment_id,
            disabled: false,
            ..Self::shell()
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.disabled && self.withdrawable_tokens > 0
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Shell exists, deposit locked
    Pending,
    Finalized,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub locked_tokens: u128,
    pub received_at_block: u64,
    pub status: TransferStatus,
}

impl TransferRecord {
    pub const LEN: usize = 16 + 8 + 1;

    pub fn pending(locked_tokens: u128, received_at_block: u64) -> Self {
        Self {
            locked_tokens,
            received_at_block,
            status: TransferStatus::Pending,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == TransferStatus::Finalized
    }
}

/// Where a subgraph id stands in the migration workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Untransferred,
    Shelled { locked_tokens: u128 },
    Finalized,
}

impl From<Option<&TransferRecord>> for TransferState {
    fn from(record: Option<&TransferRecord>) -> Self {
        match record {
            None => Self::Untransferred,
            Some(r) if r.is_finalized() => Self::Finalized,
            Some(r) => Self::Shelled {
                locked_tokens: r.locked_tokens,
            },
        }
    }
}
