use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use ethereum_types::Address;
use tracing::debug;

use crate::{
    error::{MigrationError, MigrationResult},
    math::checked_add,
    state::{SubgraphRecord, TransferRecord, TransferState},
    types::SubgraphId,
};

/// Storage for subgraphs, their L1 transfer progress, owners and curator
/// balances. All keys are L2 subgraph ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubgraphRegistry {
    subgraphs: BTreeMap<SubgraphId, SubgraphRecord>,
    transfers: BTreeMap<SubgraphId, TransferRecord>,
    owners: BTreeMap<SubgraphId, Address>,
    curator_signal: BTreeMap<(SubgraphId, Address), u128>,
    account_seq: BTreeMap<Address, u64>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RegistrySnapshot {
    subgraphs: Vec<(SubgraphId, SubgraphRecord)>,
    transfers: Vec<(SubgraphId, TransferRecord)>,
    owners: Vec<(SubgraphId, [u8; 20])>,
    curator_signal: Vec<(SubgraphId, [u8; 20], u128)>,
    account_seq: Vec<([u8; 20], u64)>,
}

impl SubgraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, id: &SubgraphId) -> bool {
        self.subgraphs.contains_key(id)
    }

    pub fn subgraph(&self, id: &SubgraphId) -> Option<&SubgraphRecord> {
        self.subgraphs.get(id)
    }

    pub fn subgraph_mut(&mut self, id: &SubgraphId) -> Option<&mut SubgraphRecord> {
        self.subgraphs.get_mut(id)
    }

    pub fn create(&mut self, id: SubgraphId, record: SubgraphRecord) -> MigrationResult<()> {
        if self.exists(&id) {
            return Err(MigrationError::SubgraphAlreadyExists);
        }
        debug!(subgraph = %id, "registry: create subgraph");
        self.subgraphs.insert(id, record);
        Ok(())
    }

    /// Inserts an empty disabled record unless one already exists. Returns
    /// whether a record was created.
    pub fn insert_shell_if_absent(&mut self, id: SubgraphId) -> bool {
        if self.exists(&id) {
            return false;
        }
        debug!(subgraph = %id, "registry: create subgraph shell");
        self.subgraphs.insert(id, SubgraphRecord::shell());
        true
    }

    pub fn disable(&mut self, id: &SubgraphId) -> MigrationResult<()> {
        let record = self.subgraphs.get_mut(id).ok_or(MigrationError::NotOwner)?;
        record.disabled = true;
        Ok(())
    }

    pub fn transfer(&self, id: &SubgraphId) -> Option<&TransferRecord> {
        self.transfers.get(id)
    }

    pub fn transfer_mut(&mut self, id: &SubgraphId) -> Option<&mut TransferRecord> {
        self.transfers.get_mut(id)
    }

    pub fn set_transfer(&mut self, id: SubgraphId, record: TransferRecord) {
        self.transfers.insert(id, record);
    }

    pub fn transfer_state(&self, id: &SubgraphId) -> TransferState {
        TransferState::from(self.transfers.get(id))
    }

    pub fn owner_of(&self, id: &SubgraphId) -> Option<Address> {
        self.owners.get(id).copied()
    }

    /// Assigns ownership if the id has no owner yet. Returns the owner in
    /// effect afterwards.
    pub fn assign_owner_if_absent(&mut self, id: SubgraphId, owner: Address) -> Address {
        *self.owners.entry(id).or_insert(owner)
    }

    pub fn set_owner(&mut self, id: SubgraphId, owner: Address) {
        self.owners.insert(id, owner);
    }

    pub fn burn_owner(&mut self, id: &SubgraphId) -> Option<Address> {
        self.owners.remove(id)
    }

    pub fn curator_signal(&self, id: &SubgraphId, curator: &Address) -> u128 {
        self.curator_signal
            .get(&(*id, *curator))
            .copied()
            .unwrap_or(0)
    }

    pub fn add_curator_signal(
        &mut self,
        id: SubgraphId,
        curator: Address,
        n_signal: u128,
    ) -> MigrationResult<u128> {
        let balance = self.curator_signal.entry((id, curator)).or_insert(0);
        *balance = checked_add(*balance, n_signal)?;
        Ok(*balance)
    }

    pub fn has_curator_entry(&self, id: &SubgraphId, curator: &Address) -> bool {
        self.curator_signal.contains_key(&(*id, *curator))
    }

    /// Sequence number for the next subgraph `account` publishes locally.
    pub fn next_account_seq(&mut self, account: Address) -> u64 {
        let seq = self.account_seq.entry(account).or_insert(0);
        let current = *seq;
        *seq += 1;
        current
    }

    pub fn subgraph_count(&self) -> usize {
        self.subgraphs.len()
    }

    /// Borsh encoding of the whole store, ordered by key.
    pub fn snapshot(&self) -> MigrationResult<Vec<u8>> {
        let snapshot = RegistrySnapshot {
            subgraphs: self
                .subgraphs
                .iter()
                .map(|(id, r)| (*id, r.clone()))
                .collect(),
            transfers: self
                .transfers
                .iter()
                .map(|(id, r)| (*id, r.clone()))
                .collect(),
            owners: self
                .owners
                .iter()
                .map(|(id, owner)| (*id, owner.to_fixed_bytes()))
                .collect(),
            curator_signal: self
                .curator_signal
                .iter()
                .map(|((id, curator), signal)| (*id, curator.to_fixed_bytes(), *signal))
                .collect(),
            account_seq: self
                .account_seq
                .iter()
                .map(|(account, seq)| (account.to_fixed_bytes(), *seq))
                .collect(),
        };
        snapshot
            .try_to_vec()
            .map_err(|_| MigrationError::CorruptSnapshot)
    }

    pub fn restore(data: &[u8]) -> MigrationResult<Self> {
        let snapshot =
            RegistrySnapshot::try_from_slice(data).map_err(|_| MigrationError::CorruptSnapshot)?;
        Ok(Self {
            subgraphs: snapshot.subgraphs.into_iter().collect(),
            transfers: snapshot.transfers.into_iter().collect(),
            owners: snapshot
                .owners
                .into_iter()
                .map(|(id, owner)| (id, Address::from(owner)))
                .collect(),
            curator_signal: snapshot
                .curator_signal
                .into_iter()
                .map(|(id, curator, signal)| ((id, Address::from(curator)), signal))
                .collect(),
            account_seq: snapshot
                .account_seq
                .into_iter()
                .map(|(account, seq)| (Address::from(account), seq))
                .collect(),
        })
    }
}
