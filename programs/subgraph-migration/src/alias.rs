//! Identifier aliasing between the L1 and L2 id spaces.
//!
//! Subgraph ids are shifted by a fixed 256-bit offset, contract addresses by
//! the rollup's 160-bit address alias. Both wrap on overflow.

use ethereum_types::{Address, U256};

use crate::types::SubgraphId;

/// Offset added to an L1 subgraph id to obtain its L2 id.
pub const SUBGRAPH_ID_ALIAS_OFFSET: U256 = U256([
    0x0000_0000_0000_1111,
    0x0000_0000_0000_0000,
    0x0000_0000_0000_0000,
    0x1111_0000_0000_0000,
]);

/// Offset the rollup adds to an L1 contract address when it sends an L2
/// message on that contract's behalf.
pub const ADDRESS_ALIAS_OFFSET: [u8; 20] = [
    0x11, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x11, 0x11,
];

/// `(l1_id + OFFSET) mod 2^256`.
pub fn l2_subgraph_id(l1_id: SubgraphId) -> SubgraphId {
    SubgraphId(l1_id.0.overflowing_add(SUBGRAPH_ID_ALIAS_OFFSET).0)
}

pub fn apply_l1_to_l2_alias(l1_address: &Address) -> Address {
    let (sum, _) = address_word(l1_address).overflowing_add(address_word_of(&ADDRESS_ALIAS_OFFSET));
    word_to_address(sum)
}

pub fn undo_l1_to_l2_alias(l2_address: &Address) -> Address {
    let (diff, _) = address_word(l2_address).overflowing_sub(address_word_of(&ADDRESS_ALIAS_OFFSET));
    word_to_address(diff)
}

fn address_word(address: &Address) -> U256 {
    address_word_of(address.as_fixed_bytes())
}

fn address_word_of(bytes: &[u8; 20]) -> U256 {
    U256::from_big_endian(bytes)
}

// Keeps the low 160 bits, which is the modular reduction for addresses.
fn word_to_address(word: U256) -> Address {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    Address::from_slice(&bytes[12..])
}
