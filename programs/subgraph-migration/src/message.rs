use arrayref::array_ref;
use ethereum_types::{Address, U256};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    error::{MigrationError, MigrationResult},
    types::SubgraphId,
};

pub const WORD_LEN: usize = 32;

/// `(uint8 code, uint256 l1SubgraphId, address beneficiary)`
pub const PAYLOAD_LEN: usize = 3 * WORD_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum MessageCode {
    ReceiveSubgraph = 0,
    ReceiveCuratorBalance = 1,
}

/// Callhook payload sent by the L1 counterpart along with the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMessage {
    /// Effects:
    /// - creates the disabled subgraph shell at the aliased id
    /// - locks the curation deposit until the owner finishes the transfer
    ReceiveSubgraph {
        l1_subgraph_id: SubgraphId,
        beneficiary: Address,
    },

    /// Effects:
    /// - credits the beneficiary with signal on an already finished subgraph
    /// - refunds the tokens otherwise
    ReceiveCuratorBalance {
        l1_subgraph_id: SubgraphId,
        beneficiary: Address,
    },
}

impl MigrationMessage {
    pub fn code(&self) -> MessageCode {
        match self {
            Self::ReceiveSubgraph { .. } => MessageCode::ReceiveSubgraph,
            Self::ReceiveCuratorBalance { .. } => MessageCode::ReceiveCuratorBalance,
        }
    }

    pub fn l1_subgraph_id(&self) -> SubgraphId {
        match self {
            Self::ReceiveSubgraph { l1_subgraph_id, .. }
            | Self::ReceiveCuratorBalance { l1_subgraph_id, .. } => *l1_subgraph_id,
        }
    }

    pub fn beneficiary(&self) -> Address {
        match self {
            Self::ReceiveSubgraph { beneficiary, .. }
            | Self::ReceiveCuratorBalance { beneficiary, .. } => *beneficiary,
        }
    }

    pub fn unpack(input: &[u8]) -> MigrationResult<Self> {
        if input.len() < PAYLOAD_LEN {
            return Err(MigrationError::MalformedPayload);
        }

        let code_word = array_ref!(input, 0, WORD_LEN);
        let id_word = array_ref!(input, WORD_LEN, WORD_LEN);
        let beneficiary_word = array_ref!(input, 2 * WORD_LEN, WORD_LEN);

        // uint8 is left padded; any other set bit is not a valid encoding
        if code_word[..WORD_LEN - 1].iter().any(|b| *b != 0) {
            return Err(MigrationError::InvalidCode);
        }
        let code =
            MessageCode::from_u8(code_word[WORD_LEN - 1]).ok_or(MigrationError::InvalidCode)?;

        let l1_subgraph_id = SubgraphId::from_be_bytes(id_word);
        let beneficiary = decode_address(beneficiary_word)?;

        Ok(match code {
            MessageCode::ReceiveSubgraph => Self::ReceiveSubgraph {
                l1_subgraph_id,
                beneficiary,
            },
            MessageCode::ReceiveCuratorBalance => Self::ReceiveCuratorBalance {
                l1_subgraph_id,
                beneficiary,
            },
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PAYLOAD_LEN);
        buf.extend_from_slice(&encode_uint(U256::from(self.code() as u8)));
        buf.extend_from_slice(&self.l1_subgraph_id().to_be_bytes());
        buf.extend_from_slice(&encode_address(&self.beneficiary()));
        buf
    }
}

pub fn encode_uint(value: U256) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    value.to_big_endian(&mut word);
    word
}

pub fn encode_address(address: &Address) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

pub fn decode_address(word: &[u8; WORD_LEN]) -> MigrationResult<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(MigrationError::MalformedPayload);
    }
    Ok(Address::from_slice(&word[12..]))
}

// Helpers to build callhook payloads
pub fn receive_subgraph(l1_subgraph_id: SubgraphId, beneficiary: Address) -> Vec<u8> {
    MigrationMessage::ReceiveSubgraph {
        l1_subgraph_id,
        beneficiary,
    }
    .pack()
}

pub fn receive_curator_balance(l1_subgraph_id: SubgraphId, beneficiary: Address) -> Vec<u8> {
    MigrationMessage::ReceiveCuratorBalance {
        l1_subgraph_id,
        beneficiary,
    }
    .pack()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_payload(code: u64, id: U256, beneficiary: Address) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&encode_uint(U256::from(code)));
        buf.extend_from_slice(&encode_uint(id));
        buf.extend_from_slice(&encode_address(&beneficiary));
        buf
    }

    #[test]
    fn matches_abi_layout() {
        let beneficiary = Address::from_low_u64_be(0x42);
        let payload = receive_curator_balance(SubgraphId::from(1337u64), beneficiary);
        assert_eq!(payload.len(), PAYLOAD_LEN);
        assert_eq!(payload[31], 1);
        assert_eq!(&payload[62..64], &[0x05, 0x39]);
        assert_eq!(&payload[76..96], beneficiary.as_bytes());
        assert_eq!(payload, raw_payload(1, U256::from(1337u64), beneficiary));
    }

    #[test]
    fn decodes_both_codes() {
        let beneficiary = Address::from_low_u64_be(7);
        let id = SubgraphId(U256::MAX);

        let msg = MigrationMessage::unpack(&receive_subgraph(id, beneficiary)).unwrap();
        assert_eq!(
            msg,
            MigrationMessage::ReceiveSubgraph {
                l1_subgraph_id: id,
                beneficiary
            }
        );

        let msg = MigrationMessage::unpack(&receive_curator_balance(id, beneficiary)).unwrap();
        assert_eq!(msg.code(), MessageCode::ReceiveCuratorBalance);
        assert_eq!(msg.l1_subgraph_id(), id);
        assert_eq!(msg.beneficiary(), beneficiary);
    }

    #[test]
    fn rejects_unknown_codes() {
        let beneficiary = Address::from_low_u64_be(7);
        for code in [2u64, 3, 255, 256] {
            let payload = raw_payload(code, U256::from(1337u64), beneficiary);
            assert_eq!(
                MigrationMessage::unpack(&payload),
                Err(MigrationError::InvalidCode)
            );
        }
    }

    #[test]
    fn rejects_short_and_dirty_payloads() {
        let beneficiary = Address::from_low_u64_be(7);
        let payload = receive_subgraph(SubgraphId::from(1u64), beneficiary);
        assert_eq!(
            MigrationMessage::unpack(&payload[..PAYLOAD_LEN - 1]),
            Err(MigrationError::MalformedPayload)
        );

        let mut dirty = payload.clone();
        dirty[64] = 1;
        assert_eq!(
            MigrationMessage::unpack(&dirty),
            Err(MigrationError::MalformedPayload)
        );
    }
}
