//! Identifier and amount types shared by the registry, the codec and the
//! state machine.

use std::fmt;
use std::io::{Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};
pub use ethereum_types::{Address, H256, U256};
use sha3::{Digest, Keccak256};

/// One GRT in wei (18 decimals).
pub const GRT: u128 = 1_000_000_000_000_000_000;

/// Whole GRT to wei.
pub const fn grt(whole: u128) -> u128 {
    whole * GRT
}

/// 256-bit subgraph identifier. L1 and L2 identifiers share the type; the
/// alias module maps one space onto the other.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SubgraphId(pub U256);

impl SubgraphId {
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// `keccak256(owner ‖ seq ‖ chain_id)`, the id under which a subgraph is
    /// published on a given chain.
    pub fn derive(owner: &Address, seq: U256, chain_id: U256) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(owner.as_bytes());
        hasher.update(word(seq));
        hasher.update(word(chain_id));
        Self(U256::from_big_endian(&hasher.finalize()))
    }

    /// Pre-multichain ids did not include the chain id.
    pub fn derive_legacy(owner: &Address, seq: U256) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(owner.as_bytes());
        hasher.update(word(seq));
        Self(U256::from_big_endian(&hasher.finalize()))
    }
}

fn word(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

impl From<U256> for SubgraphId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for SubgraphId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Debug for SubgraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubgraphId({:#x})", self.0)
    }
}

impl fmt::Display for SubgraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl BorshSerialize for SubgraphId {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_be_bytes())
    }
}

impl BorshDeserialize for SubgraphId {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self::from_be_bytes(&bytes))
    }
}

/// Content hash of a subgraph deployment. Zero means unset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeploymentId(pub H256);

impl DeploymentId {
    pub const ZERO: Self = Self(H256([0u8; 32]));

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<[u8; 32]> for DeploymentId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(H256(bytes))
    }
}

impl fmt::Debug for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeploymentId(0x{})", hex::encode(self.0.as_bytes()))
    }
}

impl BorshSerialize for DeploymentId {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.0.as_bytes())
    }
}

impl BorshDeserialize for DeploymentId {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self(H256(bytes)))
    }
}

/// Who is calling and at which block. Every mutating entry point takes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub block_number: u64,
}

impl CallContext {
    pub fn new(caller: Address, block_number: u64) -> Self {
        Self {
            caller,
            block_number,
        }
    }
}
