mod common;

use common::*;
use subgraph_migration::{
    alias::l2_subgraph_id,
    types::grt,
    Curation, EventType, GraphToken, MigrationEvent, SubgraphId,
};

const RETURNED: [EventType; 2] = [
    EventType::CuratorBalanceReturnedToBeneficiary,
    EventType::DepositFinalized,
];

fn finished(h: &mut Harness, l1: u64, tokens: u128) -> (SubgraphId, SubgraphId) {
    let l1_id = SubgraphId::from(l1);
    let l2_id = l2_subgraph_id(l1_id);
    h.send_subgraph(l1_id, alice(), tokens).unwrap();
    h.finish(alice(), l2_id, deployment(l1 as u8)).unwrap();
    (l1_id, l2_id)
}

#[test]
fn test_curator_balance_mints_signal() {
    let mut h = Harness::new();
    let (l1_id, l2_id) = finished(&mut h, 1, grt(1337));
    let mark = h.sm.events().len();

    h.send_curator_balance(l1_id, bob(), grt(100)).unwrap();

    assert_eq!(h.sm.curator_signal(&l2_id, &bob()), 100);
    let record = h.sm.subgraph(&l2_id).unwrap();
    assert_eq!(record.v_signal, 1437);
    assert_eq!(record.n_signal, 1437);
    assert_eq!(h.sm.curation().get_curation_pool_tokens(&deployment(1)), grt(1437));
    assert_eq!(h.sm.token().balance_of(&registry()), 0);
    assert_eq!(
        h.sm.events().types_since(mark),
        vec![
            EventType::SignalMinted,
            EventType::CuratorBalanceReceived,
            EventType::DepositFinalized,
        ]
    );
    assert_eq!(
        h.sm.events().since(mark)[1],
        MigrationEvent::CuratorBalanceReceived {
            l1_subgraph_id: l1_id,
            l2_subgraph_id: l2_id,
            curator: bob(),
            tokens: grt(100),
        }
    );
}

#[test]
fn test_curator_balances_accumulate() {
    let mut h = Harness::new();
    let (l1_id, l2_id) = finished(&mut h, 2, grt(10));

    h.send_curator_balance(l1_id, bob(), grt(5)).unwrap();
    h.send_curator_balance(l1_id, bob(), grt(5)).unwrap();
    h.send_curator_balance(l1_id, alice(), grt(1)).unwrap();

    assert_eq!(h.sm.curator_signal(&l2_id, &bob()), 10);
    assert_eq!(h.sm.curator_signal(&l2_id, &alice()), 11);
}

#[test]
fn test_curator_balance_for_missing_subgraph_is_returned() {
    let mut h = Harness::new();
    let l1_id = SubgraphId::from(3u64);
    let mark = h.sm.events().len();

    h.send_curator_balance(l1_id, bob(), grt(10)).unwrap();

    assert_eq!(h.sm.token().balance_of(&bob()), grt(10));
    assert!(h.sm.subgraph(&l2_subgraph_id(l1_id)).is_none());
    assert_eq!(h.sm.events().types_since(mark), RETURNED.to_vec());
}

#[test]
fn test_curator_balance_before_finish_is_returned() {
    let mut h = Harness::new();
    let l1_id = SubgraphId::from(4u64);
    let l2_id = l2_subgraph_id(l1_id);
    h.send_subgraph(l1_id, alice(), grt(10)).unwrap();
    let mark = h.sm.events().len();

    h.send_curator_balance(l1_id, bob(), grt(10)).unwrap();

    assert_eq!(h.sm.token().balance_of(&bob()), grt(10));
    assert!(!h.sm.registry().has_curator_entry(&l2_id, &bob()));
    // The subgraph deposit is still locked
    assert_eq!(h.sm.token().balance_of(&registry()), grt(10));
    assert_eq!(h.sm.events().types_since(mark), RETURNED.to_vec());
}

#[test]
fn test_curator_balance_for_deprecated_subgraph_is_returned() {
    let mut h = Harness::new();
    let (l1_id, l2_id) = finished(&mut h, 5, grt(10));
    let owner = h.ctx(alice());
    h.sm.deprecate_subgraph(&owner, l2_id).unwrap();
    let mark = h.sm.events().len();

    h.send_curator_balance(l1_id, bob(), grt(10)).unwrap();

    assert_eq!(h.sm.token().balance_of(&bob()), grt(10));
    assert_eq!(h.sm.curator_signal(&l2_id, &bob()), 0);
    assert_eq!(h.sm.events().types_since(mark), RETURNED.to_vec());
}

#[test]
fn test_below_minimum_curator_balance_is_returned() {
    let mut h = Harness::new();
    let (l1_id, l2_id) = finished(&mut h, 6, grt(10));

    h.send_curator_balance(l1_id, bob(), grt(1) / 10).unwrap();

    assert_eq!(h.sm.token().balance_of(&bob()), grt(1) / 10);
    assert_eq!(h.sm.curator_signal(&l2_id, &bob()), 0);
    assert_eq!(h.sm.subgraph(&l2_id).unwrap().v_signal, 10);
}

#[test]
fn test_curator_signal_follows_subgraph_ratio() {
    let mut h = Harness::new();
    let (l1_id, l2_id) = finished(&mut h, 7, grt(100));
    // Skew the ratio so n_signal is worth twice the pool signal
    h.sm.registry_mut().subgraph_mut(&l2_id).unwrap().n_signal = 200;

    h.send_curator_balance(l1_id, bob(), grt(50)).unwrap();

    assert_eq!(h.sm.curator_signal(&l2_id, &bob()), 100);
    let record = h.sm.subgraph(&l2_id).unwrap();
    assert_eq!(record.v_signal, 150);
    assert_eq!(record.n_signal, 300);
}
