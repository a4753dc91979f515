use narwhal::{Graph, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

fn positions(order: &[NodeId]) -> HashMap<NodeId, usize> {
    order.iter().enumerate().map(|(i, &v)| (v, i)).collect()
}

fn backward_links<N, L>(g: &Graph<N, L>, order: &[NodeId]) -> usize {
    let pos = positions(order);
    g.links()
        .filter(|&l| {
            let link = g.get_link(l).unwrap();
            pos[&link.source()] > pos[&link.target()]
        })
        .count()
}

fn assert_permutation<N, L>(g: &Graph<N, L>, order: &[NodeId]) {
    assert_eq!(order.len(), g.nnodes());
    let unique: BTreeSet<NodeId> = order.iter().copied().collect();
    let live: BTreeSet<NodeId> = g.nodes().collect();
    assert_eq!(unique, live);
}

fn random_graph(rng: &mut StdRng, n: usize, m: usize, dag: bool) -> Graph<u32, ()> {
    let mut g: Graph<u32, ()> = Graph::new();
    let ids: Vec<NodeId> = (0..n as u32).map(|i| g.add_node(i)).collect();
    for _ in 0..m {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        if i == j {
            continue;
        }
        let (s, t) = if dag { (i.min(j), i.max(j)) } else { (i, j) };
        g.add_link(ids[s], ids[t], ()).unwrap();
    }
    g
}

#[test]
fn two_cycle_reverses_exactly_one_link() {
    let mut g: Graph<&str, ()> = Graph::new();
    let a = g.add_node("a");
    let b = g.add_node("b");
    g.add_link(a, b, ()).unwrap();
    g.add_link(b, a, ()).unwrap();

    let order = g.topological();
    assert_eq!(order, vec![a, b]);
    assert_eq!(backward_links(&g, &order), 1);
}

#[test]
fn rank_overrides_link_direction() {
    let mut g: Graph<(&str, Option<u32>), ()> = Graph::new();
    let p = g.add_node(("p", Some(2)));
    let q = g.add_node(("q", None));
    let r = g.add_node(("r", Some(1)));
    g.add_link(p, q, ()).unwrap();
    g.add_link(q, r, ()).unwrap();

    let order = g.topological_by(|n| n.data().1);
    let pos = positions(&order);
    assert!(pos[&r] < pos[&p]);
    assert_eq!(order, vec![q, r, p]);
}

#[test]
fn heavier_direction_wins_between_parallel_links() {
    let mut g: Graph<&str, ()> = Graph::new();
    let a = g.add_node("a");
    let b = g.add_node("b");
    g.add_link(b, a, ()).unwrap();
    g.add_link(a, b, ()).unwrap();
    g.add_link(a, b, ()).unwrap();

    let order = g.topological();
    assert_eq!(order, vec![a, b]);
    assert_eq!(backward_links(&g, &order), 1);
}

#[test]
fn equal_ranks_fall_back_to_link_direction() {
    let mut g: Graph<u32, ()> = Graph::new();
    let a = g.add_node(0);
    let b = g.add_node(1);
    let c = g.add_node(2);
    g.add_link(c, b, ()).unwrap();
    g.add_link(b, a, ()).unwrap();

    assert_eq!(g.topological_by(|_| Some(7)), vec![c, b, a]);
}

#[test]
fn unranked_sources_and_sinks_keep_their_place() {
    let mut g: Graph<u32, ()> = Graph::new();
    let a = g.add_node(0);
    let b = g.add_node(1);
    let c = g.add_node(2);
    g.add_link(a, b, ()).unwrap();
    g.add_link(b, c, ()).unwrap();

    assert_eq!(g.topological(), vec![a, b, c]);
}

#[test]
fn isolated_nodes_are_ordered_by_slot() {
    let mut g: Graph<u32, ()> = Graph::new();
    let ids: Vec<NodeId> = (0..4).map(|i| g.add_node(i)).collect();
    assert_eq!(g.topological(), ids);
}

#[test]
fn component_order_covers_only_the_component() {
    let mut g: Graph<u32, ()> = Graph::new();
    let a = g.add_node(0);
    let b = g.add_node(1);
    let c = g.add_node(2);
    let d = g.add_node(3);
    g.add_link(b, a, ()).unwrap();
    g.add_link(c, d, ()).unwrap();

    assert_eq!(g.get(a).unwrap().topological(), vec![b, a]);
    assert_eq!(g.get(d).unwrap().topological(), vec![c, d]);
    assert_eq!(g.topological().len(), 4);

    let ranked = g.get(a).unwrap().topological_by(|n| Some(u32::MAX - *n.data()));
    assert_eq!(ranked, vec![b, a]);
}

#[test]
fn deleted_nodes_are_left_out() {
    let mut g: Graph<u32, ()> = Graph::new();
    let a = g.add_node(0);
    let b = g.add_node(1);
    let c = g.add_node(2);
    g.add_link(a, b, ()).unwrap();
    g.add_link(b, c, ()).unwrap();
    g.delete_node(b).unwrap();

    let order = g.topological();
    assert_eq!(order, vec![a, c]);
    assert_permutation(&g, &order);
}

#[test]
fn acyclic_graphs_get_a_true_topological_order() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let n = rng.gen_range(1..40);
        let m = rng.gen_range(0..3 * n);
        let g = random_graph(&mut rng, n, m, true);
        assert!(g.acyclic());

        let order = g.topological();
        assert_permutation(&g, &order);
        assert_eq!(backward_links(&g, &order), 0);
    }
}

#[test]
fn cyclic_graphs_reverse_at_most_half_of_their_links() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let n = rng.gen_range(2..40);
        let m = rng.gen_range(0..4 * n);
        let g = random_graph(&mut rng, n, m, false);

        let order = g.topological();
        assert_permutation(&g, &order);
        assert!(2 * backward_links(&g, &order) <= g.nlinks());
    }
}

#[test]
fn ranks_are_never_decreasing_along_the_order() {
    let mut rng = StdRng::seed_from_u64(23);
    for round in 0..60 {
        let n = rng.gen_range(2..30);
        let m = rng.gen_range(0..3 * n);
        let g = random_graph(&mut rng, n, m, round % 2 == 0);
        let ranks: Vec<Option<u32>> = (0..n)
            .map(|_| rng.gen_bool(0.6).then(|| rng.gen_range(0..5)))
            .collect();

        let order = g.topological_by(|node| ranks[*node.data() as usize]);
        assert_permutation(&g, &order);

        let seen: Vec<u32> = order
            .iter()
            .filter_map(|&v| ranks[*g.get(v).unwrap().data() as usize])
            .collect();
        assert!(
            seen.windows(2).all(|w| w[0] <= w[1]),
            "ranks out of order: {seen:?}"
        );
    }
}

#[test]
fn ranked_acyclic_graphs_stay_forward_where_ranks_allow() {
    let mut g: Graph<Option<u8>, ()> = Graph::new();
    let a = g.add_node(None);
    let b = g.add_node(Some(1));
    let c = g.add_node(None);
    let d = g.add_node(Some(2));
    g.add_link(a, b, ()).unwrap();
    g.add_link(b, c, ()).unwrap();
    g.add_link(c, d, ()).unwrap();

    let order = g.topological_by(|n| *n.data());
    assert_eq!(order, vec![a, b, c, d]);
}

#[test]
fn sink_leaning_free_node_goes_to_the_back() {
    let mut g: Graph<Option<u8>, ()> = Graph::new();
    let t = g.add_node(Some(0));
    let u = g.add_node(Some(1));
    let f = g.add_node(None);
    g.add_link(t, f, ()).unwrap();
    g.add_link(u, f, ()).unwrap();
    g.add_link(f, t, ()).unwrap();
    g.add_link(u, t, ()).unwrap();

    // No sources or sinks at the start, and `f` (two in, one out) is the best candidate.
    let order = g.topological_by(|n| *n.data());
    assert_eq!(order, vec![t, u, f]);
    assert!(positions(&order)[&f] >= order.len() / 2);
}

/// Float rank ordered through `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
struct Depth(f64);

impl PartialEq for Depth {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Depth {}

impl PartialOrd for Depth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Depth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[test]
fn float_ranks_work_through_a_total_order_wrapper() {
    let mut g: Graph<Option<f64>, ()> = Graph::new();
    let a = g.add_node(Some(2.5));
    let b = g.add_node(Some(-1.0));
    let c = g.add_node(None);
    g.add_link(a, b, ()).unwrap();
    g.add_link(b, c, ()).unwrap();

    let order = g.topological_by(|n| n.data().map(Depth));
    assert_eq!(order, vec![b, a, c]);
}
