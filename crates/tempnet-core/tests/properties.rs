//! Property tests for tempnet-core
//!
//! These tests drive long seeded sequences of random mutations through
//! graphs and temporal graphs and check the structural invariants after
//! every step.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempnet_core::{ChangeLog, Coalition, Edge, Graph, GraphBuilder, GraphChange, Search, TemporalGraph, Time};

// Test helpers
fn edge_set(g: &Graph) -> BTreeSet<Edge> {
    g.edges().collect()
}

fn random_mutation(g: &mut Graph, rng: &mut StdRng) -> bool {
    let n = g.size();
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    if rng.random_bool(0.6) {
        g.add_edge(i, j)
    } else {
        g.remove_edge(i, j)
    }
}

/// Independent record of which points each pair should carry
type Shadow = BTreeMap<Edge, BTreeSet<Time>>;

fn apply_shadow(shadow: &mut Shadow, e: Edge, begin: Time, end: Time, add: bool) {
    let points = shadow.entry(e).or_default();
    for t in begin..=end {
        if add {
            points.insert(t);
        } else {
            points.remove(&t);
        }
    }
    if points.is_empty() {
        shadow.remove(&e);
    }
}

fn check_against_shadow(g: &TemporalGraph, shadow: &Shadow, horizon: Time) {
    for i in g.nodes() {
        for j in g.nodes() {
            if i == j {
                continue;
            }
            let e = g.edge(i, j);
            let expected = shadow.get(&e);
            assert_eq!(g.contains_edge(i, j), expected.is_some(), "edge {e}");
            for t in 0..horizon {
                let active = expected.is_some_and(|p| p.contains(&t));
                assert_eq!(g.contains_t_edge(i, j, t), active, "edge {e} at {t}");
            }
        }
    }
    let true_max = shadow.values().filter_map(|p| p.last().copied()).max().unwrap_or(0);
    assert_eq!(g.t() - 1, true_max);
}

#[test]
fn test_undirected_symmetry_and_edge_count() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut g = Graph::new("random", 25, false);
    for _ in 0..2_000 {
        random_mutation(&mut g, &mut rng);
        assert_eq!(g.edges_count(), g.edges().count());
    }
    for i in g.nodes() {
        for j in g.nodes() {
            assert_eq!(g.contains_edge(i, j), g.contains_edge(j, i));
        }
    }
}

#[test]
fn test_directed_edge_count() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut g = Graph::new("random", 20, true);
    for _ in 0..2_000 {
        random_mutation(&mut g, &mut rng);
        assert_eq!(g.edges_count(), g.edges().count());
    }
    let in_total: usize = g.nodes().map(|v| g.in_degree(v)).sum();
    assert_eq!(in_total, g.edges_count());
}

#[test]
fn test_history_round_trip() {
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut g = GraphBuilder::new(30).erdos_renyi(4, &mut rng).unwrap();
        let original = edge_set(&g);

        g.start_recording_history();
        for _ in 0..500 {
            random_mutation(&mut g, &mut rng);
        }
        g.reset_graph();
        assert_eq!(edge_set(&g), original, "seed {seed}");
        assert_eq!(g.edges_count(), original.len());
    }
}

#[test]
fn test_revert_then_replay_is_exact() {
    let mut rng = StdRng::seed_from_u64(4242);
    let mut g = Graph::new("replay", 15, true);
    g.start_recording_history();
    for _ in 0..300 {
        random_mutation(&mut g, &mut rng);
    }

    let before = edge_set(&g);
    let recorded: Vec<Edge> = g.changes().collect();
    let k = 40.min(recorded.len());
    let replay = &recorded[recorded.len() - k..];
    g.revert_changes(k);

    for e in replay {
        g.swap_edge(e.i(), e.j());
    }
    assert_eq!(edge_set(&g), before);
}

#[test]
fn test_reset_fires_once_for_long_history() {
    let log = Rc::new(ChangeLog::new());
    let mut rng = StdRng::seed_from_u64(9);
    let mut g = Graph::new("quiet", 12, false);
    g.subscribe(log.clone());
    g.start_recording_history();
    for _ in 0..200 {
        random_mutation(&mut g, &mut rng);
    }
    log.clear();
    g.reset_graph();
    assert_eq!(log.changes(), vec![GraphChange::Reset]);
    assert_eq!(g.edges_count(), 0);
}

#[test]
fn test_timeline_consistency() {
    let mut rng = StdRng::seed_from_u64(31337);
    for directed in [false, true] {
        let mut g = TemporalGraph::new("shadowed", 8, directed);
        let mut shadow = Shadow::new();
        for step in 0..600 {
            let i = rng.random_range(0..8);
            let j = rng.random_range(0..8);
            if i == j {
                continue;
            }
            let begin = rng.random_range(0..30);
            let end = begin + rng.random_range(0..6);
            let add = rng.random_bool(0.55);
            let e = g.edge(i, j);
            if add {
                g.add_t_edge_range(i, j, begin, end).unwrap();
            } else {
                g.remove_t_edge_range(i, j, begin, end).unwrap();
            }
            apply_shadow(&mut shadow, e, begin, end, add);
            if step % 50 == 0 {
                check_against_shadow(&g, &shadow, 40);
            }
        }
        check_against_shadow(&g, &shadow, 40);
    }
}

#[test]
fn test_temporal_history_round_trip() {
    let mut rng = StdRng::seed_from_u64(555);
    let mut g = TemporalGraph::new("rollback", 10, false);
    let mut shadow = Shadow::new();
    for _ in 0..100 {
        let (i, j) = (rng.random_range(0..10), rng.random_range(0..10));
        if i != j {
            let t = rng.random_range(0..20);
            g.add_t_edge(i, j, t);
            apply_shadow(&mut shadow, g.edge(i, j), t, t, true);
        }
    }

    g.start_recording_history();
    for _ in 0..300 {
        let (i, j) = (rng.random_range(0..10), rng.random_range(0..10));
        let begin = rng.random_range(0..25);
        let end = begin + rng.random_range(0..4);
        if rng.random_bool(0.5) {
            g.add_t_edge_range(i, j, begin, end).unwrap();
        } else {
            g.remove_t_edge_range(i, j, begin, end).unwrap();
        }
    }
    g.reset_graph();
    check_against_shadow(&g, &shadow, 30);
}

#[test]
fn test_latency_monotone_on_random_contacts() {
    let mut rng = StdRng::seed_from_u64(2024);
    let n = 12;
    let mut g = TemporalGraph::new("random-contacts", n, false);
    for _ in 0..120 {
        let (i, j) = (rng.random_range(0..n), rng.random_range(0..n));
        g.add_t_edge(i, j, rng.random_range(0..40));
    }

    let start = Instant::now();
    let table = g.latency_table();
    println!("Latency table for {} contacts in {:?}", g.contacts_count(), start.elapsed());

    for i in 0..n {
        for j in 0..n {
            let mut last_arrival = 0;
            let mut lost = false;
            for t in 0..table.horizon() {
                match table.latency(i, j, t) {
                    Some(l) => {
                        assert!(!lost, "({i},{j}) reachable again at {t}");
                        assert!(t + l >= last_arrival, "({i},{j}) arrives earlier at {t}");
                        last_arrival = t + l;
                    }
                    None => lost = true,
                }
            }
            if i != j && table.records(i, j).is_empty() {
                assert!(table.average_latency(i, j).is_infinite());
            }
        }
    }
}

#[test]
fn test_latency_independent_of_insertion_order() {
    let mut rng = StdRng::seed_from_u64(808);
    let n = 9;
    let mut contacts: Vec<(usize, usize, Time)> = Vec::new();
    for _ in 0..70 {
        let (i, j) = (rng.random_range(0..n), rng.random_range(0..n));
        if i != j {
            contacts.push((i, j, rng.random_range(0..12)));
        }
    }
    let a = TemporalGraph::from_contacts("a", n, true, &contacts);
    contacts.reverse();
    let b = TemporalGraph::from_contacts("b", n, true, &contacts);

    let (ta, tb) = (a.latency_table(), b.latency_table());
    for i in 0..n {
        for j in 0..n {
            assert_eq!(ta.records(i, j), tb.records(i, j));
        }
    }
}

#[test]
fn test_forced_connectivity_on_many_components() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut g = TemporalGraph::new("islands", 40, false);
    for k in 0..10 {
        g.add_t_edge(4 * k, 4 * k + 1, k as Time);
    }
    let components = g.number_of_connected_components();
    let before = g.edges_count();
    g.force_connectivity(&mut rng);
    assert!(g.is_connected());
    assert_eq!(g.edges_count(), before + components - 1);
    assert!(g.max_time() <= 9);
}

#[test]
fn test_coalition_sampling_is_uniform() {
    let mut rng = StdRng::seed_from_u64(1);
    let c: Coalition = (0..10).collect();
    let mut hits = [0usize; 10];
    for _ in 0..20_000 {
        hits[c.random_with(&mut rng).unwrap()] += 1;
    }
    assert!(hits.iter().all(|&h| (1_600..2_400).contains(&h)), "skewed: {hits:?}");

    for k in 0..=12 {
        let subset = c.random_subset_with(&mut rng, k);
        assert_eq!(subset.len(), k.min(10));
        assert!(subset.is_subset(&c));
    }
}

#[test]
fn test_search_agrees_with_components() {
    let mut rng = StdRng::seed_from_u64(12);
    for round in 0..30 {
        let mut g = Graph::new("sparse", 25, round % 2 == 1);
        for _ in 0..20 {
            random_mutation(&mut g, &mut rng);
        }
        let start = rng.random_range(0..g.size());
        let undirected = g.to_undirected();

        let mut bfs = Search::new(&undirected);
        bfs.breadth_first(start, &mut ());
        assert_eq!(bfs.visited(), undirected.connected_component(start, None), "round {round}");

        let mut dfs = Search::new(&undirected);
        dfs.depth_first(start, &mut ());
        assert_eq!(dfs.visited(), bfs.visited(), "round {round}");
        for v in dfs.visited().iter().filter(|&v| v != start) {
            let path = dfs.path_to(v);
            assert_eq!(path.first(), Some(&start));
            assert!(path.windows(2).all(|w| undirected.contains_edge(w[0], w[1])));
        }
    }
}
