//! Traversals over the node arena.
//!
//! Every walk keeps an explicit visited set; none of them assume the graph is acyclic.

use super::entries::{Adjacency, NodeEntry};
use rustc_hash::FxBuildHasher;
use std::collections::VecDeque;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Which way to follow links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Direction {
    /// Source to target.
    Children,
    /// Target to source.
    Parents,
}

impl Direction {
    pub(crate) fn adjacency<N>(self, entry: &NodeEntry<N>) -> &Adjacency {
        match self {
            Direction::Children => &entry.children,
            Direction::Parents => &entry.parents,
        }
    }
}

/// All nodes reachable from `start` ignoring link direction, in breadth-first order.
pub(crate) fn component<N>(nodes: &[NodeEntry<N>], start: u32) -> Vec<u32> {
    let mut seen: HashSet<u32> = HashSet::default();
    let mut out: Vec<u32> = Vec::new();
    let mut queue: VecDeque<u32> = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);
    while let Some(v) = queue.pop_front() {
        out.push(v);
        let entry = &nodes[v as usize];
        for &w in entry.children.keys().chain(entry.parents.keys()) {
            if seen.insert(w) {
                queue.push_back(w);
            }
        }
    }
    out
}

/// Nodes reachable from `start` along `dir`, including `start`, in depth-first preorder.
pub(crate) fn reachable<N>(nodes: &[NodeEntry<N>], start: u32, dir: Direction) -> Vec<u32> {
    let mut seen: HashSet<u32> = HashSet::default();
    let mut out: Vec<u32> = Vec::new();
    let mut stack: Vec<u32> = vec![start];
    while let Some(v) = stack.pop() {
        if !seen.insert(v) {
            continue;
        }
        out.push(v);
        // Reversed so the first neighbor is visited first.
        for &w in dir.adjacency(&nodes[v as usize]).keys().rev() {
            if !seen.contains(&w) {
                stack.push(w);
            }
        }
    }
    out
}

/// Kahn's algorithm restricted to `members`, which must be closed under adjacency.
pub(crate) fn is_acyclic<N>(nodes: &[NodeEntry<N>], members: &[u32]) -> bool {
    let mut indeg: HashMap<u32, usize> = HashMap::default();
    let mut ready: Vec<u32> = Vec::new();
    for &v in members {
        let deg = nodes[v as usize].parents.len();
        if deg == 0 {
            ready.push(v);
        } else {
            indeg.insert(v, deg);
        }
    }
    let mut removed = 0usize;
    while let Some(v) = ready.pop() {
        removed += 1;
        for &w in nodes[v as usize].children.keys() {
            let Some(deg) = indeg.get_mut(&w) else {
                debug_assert!(false, "component walk reached a node outside the component");
                continue;
            };
            *deg -= 1;
            if *deg == 0 {
                ready.push(w);
            }
        }
    }
    removed == members.len()
}

/// Depth-first postorder of `members` along `dir`.
pub(crate) fn postorder<N>(nodes: &[NodeEntry<N>], members: &[u32], dir: Direction) -> Vec<u32> {
    let mut seen: HashSet<u32> = HashSet::default();
    let mut out: Vec<u32> = Vec::with_capacity(members.len());
    let mut stack: Vec<(u32, usize)> = Vec::new();
    for &start in members {
        if !seen.insert(start) {
            continue;
        }
        stack.push((start, 0));
        while let Some(top) = stack.last_mut() {
            let (v, next) = *top;
            match dir.adjacency(&nodes[v as usize]).get_index(next) {
                Some((&w, _)) => {
                    top.1 += 1;
                    if seen.insert(w) {
                        stack.push((w, 0));
                    }
                }
                None => {
                    out.push(v);
                    stack.pop();
                }
            }
        }
    }
    out
}

/// Minimal set of `members` from which every member is reachable along `dir`, with no element
/// reachable from another. With `Direction::Children` these are the roots, with
/// `Direction::Parents` the leaves.
///
/// Nodes are claimed in reverse postorder: the unclaimed node that finished last always sits in
/// a strongly connected component nothing else reaches, so each claim picks exactly one member
/// of one source component. A source-free cycle therefore contributes a single member. The
/// result follows the order of `members`.
pub(crate) fn sources<N>(nodes: &[NodeEntry<N>], members: &[u32], dir: Direction) -> Vec<u32> {
    let mut claimed: HashSet<u32> = HashSet::default();
    let mut picked: Vec<u32> = Vec::new();
    let mut stack: Vec<u32> = Vec::new();

    for v in postorder(nodes, members, dir).into_iter().rev() {
        if !claimed.insert(v) {
            continue;
        }
        picked.push(v);
        stack.push(v);
        while let Some(u) = stack.pop() {
            for &w in dir.adjacency(&nodes[u as usize]).keys() {
                if claimed.insert(w) {
                    stack.push(w);
                }
            }
        }
    }

    let position: HashMap<u32, usize> = members
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();
    picked.sort_by_key(|v| position.get(v).copied().unwrap_or(usize::MAX));
    picked
}
