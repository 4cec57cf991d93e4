//! End-to-end scenarios for the reorder -> reverse -> merge pipeline.

use cagra_builder::graph::{FixedDegreeGraph, EMPTY};
use cagra_builder::{Builder, GraphInfo};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn graph_from_rows(n: i32, k: i32, rows: &[&[i32]]) -> FixedDegreeGraph {
    let mut g = FixedDegreeGraph::new(n, k).unwrap();
    for (u, row) in rows.iter().enumerate() {
        g.row_mut(u as i32).copy_from_slice(row);
    }
    g
}

#[test]
fn scenario_a_trivial_chain() {
    // N=4, R_KNNG=3, R_INIT=3, R=2.
    let knng = graph_from_rows(
        4,
        3,
        &[
            &[1, 2, 3],
            &[0, 2, 3],
            &[1, 0, 3],
            &[2, 1, 0],
        ],
    );

    let info = GraphInfo {
        n: 4,
        r: 2,
        r_init: 3,
        r_knng: 3,
    };
    let builder = Builder::new(info).unwrap();
    let graph = builder.build(knng).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.degree(), 2);
    assert_eq!(graph.row(0), &[1, 2]);
    assert_eq!(graph.row(1), &[0, 3]);
    assert_eq!(graph.row(2), &[1, 0]);
    assert_eq!(graph.row(3), &[2, 1]);

    // Invariant 6 / final-graph sentinel rule (scenario F): no -1 remains.
    for u in 0..4 {
        assert!(!graph.row(u).contains(&EMPTY));
    }
}

#[test]
fn scenario_b_full_symmetry() {
    // N=3, R_KNNG=2, R_INIT=2, R=2. Every edge is already mutual, so the
    // reverse graph is empty after dedup and the merged graph equals the
    // reordered graph exactly.
    let knng = graph_from_rows(3, 2, &[&[1, 2], &[0, 2], &[0, 1]]);

    let info = GraphInfo {
        n: 3,
        r: 2,
        r_init: 2,
        r_knng: 2,
    };
    let builder = Builder::new(info).unwrap();
    let graph = builder.build(knng).unwrap();

    for u in 0..3i32 {
        let row = graph.row(u);
        assert!(!row.contains(&EMPTY));
        let mut others: Vec<i32> = (0..3).filter(|&v| v != u).collect();
        let mut got = row.to_vec();
        others.sort_unstable();
        got.sort_unstable();
        assert_eq!(got, others);
    }
}

#[test]
fn scenario_e_mutual_candidates_are_not_duplicated() {
    // N=2, R=1: the only candidate for each node is the other node, so
    // reorder trivially keeps the mutual edge. ReverseStage must then drop
    // both reverse-insertion attempts, since each node already has the other
    // in its forward row.
    let knng = graph_from_rows(2, 1, &[&[1], &[0]]);

    let info = GraphInfo {
        n: 2,
        r: 1,
        r_init: 1,
        r_knng: 1,
    };
    let builder = Builder::new(info).unwrap();
    let graph = builder.build(knng).unwrap();

    assert_eq!(graph.row(0), &[1]);
    assert_eq!(graph.row(1), &[0]);
}

fn random_knng(n: i32, k: i32, seed: u64) -> FixedDegreeGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = FixedDegreeGraph::new(n, k).unwrap();
    for x in 0..n {
        let mut others: Vec<i32> = (0..n).filter(|&v| v != x).collect();
        others.shuffle(&mut rng);
        others.truncate(k as usize);
        graph.row_mut(x).copy_from_slice(&others);
    }
    graph
}

#[test]
fn invariants_hold_on_random_graphs() {
    let cases: &[(i32, i32, i32, i32, u64)] = &[
        (50, 4, 8, 16, 1),
        (200, 8, 16, 24, 2),
        (37, 2, 5, 9, 3),
    ];

    for &(n, r, r_init, r_knng, seed) in cases {
        let knng = random_knng(n, r_knng, seed);
        let info = GraphInfo {
            n,
            r,
            r_init,
            r_knng,
        };
        let builder = Builder::new(info).unwrap();
        let graph = builder.build(knng).unwrap();

        // Invariant 1: output shape.
        assert_eq!(graph.node_count(), n);
        assert_eq!(graph.degree(), r);

        for x in 0..n {
            let row = graph.row(x);

            // Invariant 2: every slot is -1 or a valid node id.
            for &v in row {
                assert!(v == EMPTY || (0..n).contains(&v));
            }

            // Invariant 3: non-sentinel entries are pairwise distinct.
            let mut non_empty: Vec<i32> = row.iter().copied().filter(|&v| v != EMPTY).collect();
            let before = non_empty.len();
            non_empty.sort_unstable();
            non_empty.dedup();
            assert_eq!(non_empty.len(), before);
        }
    }
}

#[test]
fn knng_reserialization_is_byte_identical() {
    // Invariant 8: loading a saved KNNG and saving it again is a no-op on
    // the bytes.
    let graph = random_knng(20, 6, 42);

    let first = tempfile::NamedTempFile::new().unwrap();
    graph.save_knng(first.path()).unwrap();

    let reloaded = FixedDegreeGraph::load_knng(first.path()).unwrap();
    let second = tempfile::NamedTempFile::new().unwrap();
    reloaded.save_knng(second.path()).unwrap();

    let first_bytes = std::fs::read(first.path()).unwrap();
    let second_bytes = std::fs::read(second.path()).unwrap();
    assert_eq!(first_bytes, second_bytes);
}
