//! Integration tests for tn-network.

use proptest::prelude::*;
use tn_core::{NodeId, Tolerances, nearly_equal};
use tn_network::{NetworkError, RcNetworkBuilder, ResistorSet, par, parse_params};

fn n(i: u32) -> NodeId {
    NodeId::from_index(i)
}

fn close(a: f64, b: f64) -> bool {
    nearly_equal(a, b, Tolerances { abs: 1e-12, rel: 1e-8 })
}

fn eliminate_in_order(set: &ResistorSet, order: &[u32]) -> ResistorSet {
    order
        .iter()
        .fold(set.clone(), |acc, &node| acc.eliminate(n(node)).unwrap())
}

fn assert_equivalent(x: &ResistorSet, y: &ResistorSet) {
    assert_eq!(x.len(), y.len());
    for (a, b, r) in x.iter() {
        let other = y.get(a, b).expect("same resistor pairs");
        assert!(close(r, other), "{a}-{b}: {r} vs {other}");
    }
}

#[test]
fn wall_network_from_named_params() {
    // Exterior wall: outdoor -> ext surface -> wall mass -> int surface -> indoor.
    let params = parse_params([
        ("R_EXT_WS1", 0.01),
        ("R_WS1_WALL", 0.02),
        ("R_WALL_WS2", 0.02),
        ("R_WS2_INT", 0.03),
        ("C_WALL", 2.0e6),
        ("C_INT", 5.0e5),
    ])
    .unwrap();
    let network = RcNetworkBuilder::from_params(&params, &["EXT"])
        .build()
        .unwrap();

    assert_eq!(network.state_names(), vec!["T_WALL", "T_INT"]);
    assert_eq!(network.input_names(), vec!["T_EXT", "H_WALL", "H_INT"]);
    assert_eq!(network.eliminated_names(), vec!["WS1", "WS2"]);

    let wall = network.node_id("WALL").unwrap();
    let int = network.node_id("INT").unwrap();
    let ext = network.node_id("EXT").unwrap();
    assert!(close(network.resistors().get(ext, wall).unwrap(), 0.03));
    assert!(close(network.resistors().get(wall, int).unwrap(), 0.05));
}

#[test]
fn ambiguous_short_names_the_floating_node() {
    let params = parse_params([
        ("C_A", 1.0),
        ("C_B", 1.0),
        ("R_A_F", 0.0),
        ("R_B_F", 0.0),
        ("R_A_EXT", 1.0),
    ])
    .unwrap();
    let err = RcNetworkBuilder::from_params(&params, &["EXT"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        NetworkError::AmbiguousShort {
            node: "F".into(),
            count: 2
        }
    );
}

#[test]
fn zero_edge_merges_floating_node() {
    let params = parse_params([
        ("C_A", 1.0),
        ("R_A_F", 0.0),
        ("R_F_EXT", 2.0),
        ("R_A_EXT", 2.0),
    ])
    .unwrap();
    let network = RcNetworkBuilder::from_params(&params, &["EXT"])
        .build()
        .unwrap();
    let a = network.node_id("A").unwrap();
    let ext = network.node_id("EXT").unwrap();
    assert!(close(network.resistors().get(a, ext).unwrap(), 1.0));
}

fn random_network() -> impl Strategy<Value = (u32, ResistorSet, Vec<u32>)> {
    (5_u32..9).prop_flat_map(|size| {
        let extra = prop::collection::vec((0..size, 0..size, 0.1_f64..10.0), 0..(2 * size as usize));
        let chain = prop::collection::vec(0.1_f64..10.0, (size - 1) as usize);
        let order: Vec<u32> = (2..size).collect();
        (Just(size), chain, extra, Just(order).prop_shuffle())
            .prop_map(|(size, chain, extra, order)| {
                let mut set: ResistorSet = chain
                    .iter()
                    .enumerate()
                    .map(|(i, &r)| (n(i as u32), n(i as u32 + 1), r))
                    .collect();
                for (a, b, r) in extra {
                    set.insert_parallel(n(a), n(b), r);
                }
                (size, set, order)
            })
    })
}

proptest! {
    #[test]
    fn parallel_of_two_matches_product_over_sum(r1 in 1e-3_f64..1e3, r2 in 1e-3_f64..1e3) {
        prop_assert!(close(par(&[r1, r2]), r1 * r2 / (r1 + r2)));
        prop_assert_eq!(par(&[0.0, r2]), 0.0);
    }

    #[test]
    fn elimination_order_does_not_change_network((_, set, order) in random_network()) {
        let forward: Vec<u32> = { let mut o = order.clone(); o.sort(); o };
        let backward: Vec<u32> = forward.iter().rev().copied().collect();

        let a = eliminate_in_order(&set, &forward);
        let b = eliminate_in_order(&set, &backward);
        let c = eliminate_in_order(&set, &order);
        assert_equivalent(&a, &b);
        assert_equivalent(&a, &c);
    }

    #[test]
    fn reduction_preserves_effective_resistance((_, set, order) in random_network()) {
        let before = set.effective_resistance(n(0), n(1)).unwrap().unwrap();
        let reduced = eliminate_in_order(&set, &order);
        let after = reduced.get(n(0), n(1)).unwrap();
        prop_assert!(close(before, after), "{} vs {}", before, after);
    }
}
