//! Tests for Domain Services - metric laws and closest-K selection

use super::*;
use crate::domain::{Contact, NodeId, Timestamp, NODE_ID_LEN};
use proptest::prelude::*;

fn make_node_id(first_byte: u8) -> NodeId {
    let mut bytes = [0u8; NODE_ID_LEN];
    bytes[0] = first_byte;
    NodeId::from_bytes(bytes)
}

fn make_contact(id: NodeId) -> Contact {
    Contact::new("127.0.0.1", 8080, id, Timestamp::new(1000))
}

fn arb_node_id() -> impl Strategy<Value = NodeId> {
    any::<[u8; NODE_ID_LEN]>().prop_map(NodeId::from_bytes)
}

// =============================================================================
// Test Group 1: XOR Distance Calculation
// =============================================================================

proptest! {
    #[test]
    fn prop_xor_distance_is_symmetric(a in arb_node_id(), b in arb_node_id()) {
        prop_assert_eq!(xor_distance(&a, &b), xor_distance(&b, &a));
    }

    #[test]
    fn prop_xor_distance_zero_iff_equal(a in arb_node_id(), b in arb_node_id()) {
        prop_assert!(xor_distance(&a, &a).is_zero());
        prop_assert_eq!(xor_distance(&a, &b).is_zero(), a == b);
    }

    #[test]
    fn prop_bucket_index_matches_highest_differing_bit(a in arb_node_id(), b in arb_node_id()) {
        prop_assume!(a != b);
        let idx = bucket_index(&a, &b);
        prop_assert!(idx < 160);

        // Bit `idx` (counted from the least-significant end) differs,
        // every bit above it agrees.
        let bit = |id: &NodeId, i: usize| {
            let byte = id.as_bytes()[NODE_ID_LEN - 1 - i / 8];
            (byte >> (i % 8)) & 1
        };
        prop_assert_ne!(bit(&a, idx), bit(&b, idx));
        for higher in idx + 1..160 {
            prop_assert_eq!(bit(&a, higher), bit(&b, higher));
        }
    }
}

#[test]
fn test_bucket_index_identifies_correct_bucket() {
    let local = NodeId::zero();

    assert_eq!(bucket_index(&local, &make_node_id(0b1000_0000)), 159);
    assert_eq!(bucket_index(&local, &make_node_id(0b0100_0000)), 158);

    let mut second_byte = [0u8; NODE_ID_LEN];
    second_byte[1] = 0b1000_0000;
    assert_eq!(bucket_index(&local, &NodeId::from_bytes(second_byte)), 151);
}

// =============================================================================
// Test Group 2: Closest-K selection
// =============================================================================

#[test]
fn test_sort_orders_by_distance_to_target() {
    let target = NodeId::zero();

    let far = make_contact(make_node_id(0b1000_0000));
    let mut mid_bytes = [0u8; NODE_ID_LEN];
    mid_bytes[1] = 0b1000_0000;
    let mid = make_contact(NodeId::from_bytes(mid_bytes));
    let mut close_bytes = [0u8; NODE_ID_LEN];
    close_bytes[NODE_ID_LEN - 1] = 1;
    let close = make_contact(NodeId::from_bytes(close_bytes));

    let mut contacts = vec![far.clone(), close.clone(), mid.clone()];
    sort_contacts_by_distance(&mut contacts, &target);

    assert_eq!(contacts[0].node_id, close.node_id);
    assert_eq!(contacts[1].node_id, mid.node_id);
    assert_eq!(contacts[2].node_id, far.node_id);
}

#[test]
fn test_find_k_closest_truncates() {
    let target = NodeId::random();
    let contacts: Vec<Contact> = (1..=10).map(|i| make_contact(make_node_id(i))).collect();

    let closest = find_k_closest(contacts.clone(), &target, 4);
    assert_eq!(closest.len(), 4);

    let all = find_k_closest(contacts, &target, 50);
    assert_eq!(all.len(), 10);
    for pair in all.windows(2) {
        assert!(xor_distance(&pair[0].node_id, &target) <= xor_distance(&pair[1].node_id, &target));
    }
}
