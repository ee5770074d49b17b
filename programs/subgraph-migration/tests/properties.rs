mod common;

use common::*;
use proptest::prelude::*;
use subgraph_migration::{
    alias::{apply_l1_to_l2_alias, l2_subgraph_id, undo_l1_to_l2_alias, SUBGRAPH_ID_ALIAS_OFFSET},
    message::{receive_curator_balance, receive_subgraph},
    types::{grt, Address, U256},
    GraphToken, MigrationMessage, SubgraphId,
};

fn any_u256() -> impl Strategy<Value = U256> {
    any::<[u64; 4]>().prop_map(U256)
}

fn any_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

proptest! {
    #[test]
    fn test_subgraph_alias_is_offset_addition(raw in any_u256()) {
        let l2 = l2_subgraph_id(SubgraphId(raw));
        prop_assert_eq!(l2.0.overflowing_sub(SUBGRAPH_ID_ALIAS_OFFSET).0, raw);
    }

    #[test]
    fn test_subgraph_alias_is_injective(a in any_u256(), b in any_u256()) {
        prop_assume!(a != b);
        prop_assert_ne!(l2_subgraph_id(SubgraphId(a)), l2_subgraph_id(SubgraphId(b)));
    }

    #[test]
    fn test_address_alias_round_trips(address in any_address()) {
        prop_assert_eq!(undo_l1_to_l2_alias(&apply_l1_to_l2_alias(&address)), address);
    }

    #[test]
    fn test_payloads_decode_to_their_message(raw in any_u256(), beneficiary in any_address()) {
        let id = SubgraphId(raw);
        prop_assert_eq!(
            MigrationMessage::unpack(&receive_subgraph(id, beneficiary)).unwrap(),
            MigrationMessage::ReceiveSubgraph { l1_subgraph_id: id, beneficiary }
        );
        prop_assert_eq!(
            MigrationMessage::unpack(&receive_curator_balance(id, beneficiary)).unwrap(),
            MigrationMessage::ReceiveCuratorBalance { l1_subgraph_id: id, beneficiary }
        );
    }

    #[test]
    fn test_received_tokens_are_conserved(whole in 1u128..1_000_000, tenths in 0u128..10) {
        let mut h = Harness::new();
        let amount = grt(whole) + grt(1) / 10 * tenths;
        let l1_id = SubgraphId::from(1u64);
        h.send_subgraph(l1_id, alice(), amount).unwrap();
        h.finish(alice(), l2_subgraph_id(l1_id), deployment(1)).unwrap();
        h.send_curator_balance(l1_id, bob(), amount).unwrap();

        let token = h.sm.token();
        prop_assert_eq!(token.total_supply(), amount * 2);
        prop_assert_eq!(token.balance_of(&curation_address()), amount * 2);
        prop_assert_eq!(token.balance_of(&registry()), 0);
    }
}
