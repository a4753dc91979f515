//! Approximate topological ordering.
//!
//! Greedy feedback-arc heuristic in the style of Eades, Lin and Smyth: sources are peeled off
//! to the front, sinks to the back, and when neither exists the node with the largest
//! `outdeg - indeg` is placed, at the front unless that score is negative. Every link that ends
//! up pointing backwards is part of the implied feedback arc set. The result is exact on acyclic
//! input and carries no optimality guarantee otherwise.
//!
//! Ranked nodes are grouped into ascending rank classes. With two or more classes left, the
//! lowest one is only ever placed at the front and the highest one only at the back; interior
//! classes wait until they become extreme. A single remaining class is placed like unranked
//! nodes. This keeps the output non-decreasing in rank. Top and bottom scores are capped at zero
//! so a ranked node never outbids an unranked one that prefers the same end.
//!
//! Ties inside a bucket are broken first-in first-out; initial pushes follow node order.

use crate::graph::entries::Adjacency;
use crate::graph::{Graph, NodeRef};
use rustc_hash::FxBuildHasher;
use std::collections::VecDeque;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Max-priority queue keyed by small integer scores.
///
/// Entries carry the node's stamp at push time. Re-bucketing a node bumps its stamp and pushes
/// again; the old entry is skipped when it surfaces.
#[derive(Debug)]
struct BucketQueue {
    buckets: Vec<VecDeque<(usize, u32)>>,
    offset: i64,
    /// No live entry sits above this bucket.
    top: usize,
}

impl BucketQueue {
    /// Queue for scores in `-span..=span`; scores outside are clamped.
    fn new(span: usize) -> Self {
        Self {
            buckets: (0..2 * span + 1).map(|_| VecDeque::new()).collect(),
            offset: span as i64,
            top: 0,
        }
    }

    fn push(&mut self, node: usize, stamp: u32, score: i64) {
        let idx = (score + self.offset).clamp(0, self.buckets.len() as i64 - 1) as usize;
        self.buckets[idx].push_back((node, stamp));
        self.top = self.top.max(idx);
    }

    /// Best live entry and its score, without removing it.
    fn peek(&mut self, stamps: &[u32]) -> Option<(usize, i64)> {
        loop {
            let bucket = &mut self.buckets[self.top];
            while let Some(&(node, stamp)) = bucket.front() {
                if stamps[node] == stamp {
                    return Some((node, self.top as i64 - self.offset));
                }
                bucket.pop_front();
            }
            if self.top == 0 {
                return None;
            }
            self.top -= 1;
        }
    }

    fn pop(&mut self, stamps: &[u32]) -> Option<usize> {
        let (node, _) = self.peek(stamps)?;
        self.buckets[self.top].pop_front();
        Some(node)
    }
}

fn pop_live(queue: &mut VecDeque<(usize, u32)>, stamps: &[u32]) -> Option<usize> {
    while let Some((node, stamp)) = queue.pop_front() {
        if stamps[node] == stamp {
            return Some(node);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Ranked, class not active yet.
    Waiting,
    /// May go to either end.
    Free,
    /// Lowest active rank class; front only.
    Top,
    /// Highest active rank class; back only.
    Bottom,
    Placed,
}

struct Placement {
    children: Vec<Vec<(usize, i64)>>,
    parents: Vec<Vec<(usize, i64)>>,
    indeg: Vec<i64>,
    outdeg: Vec<i64>,
    role: Vec<Role>,
    stamp: Vec<u32>,
    class: Vec<Option<usize>>,

    classes: Vec<Vec<usize>>,
    remaining: Vec<usize>,
    lo: usize,
    hi: usize,

    sources: VecDeque<(usize, u32)>,
    sinks: VecDeque<(usize, u32)>,
    free: BucketQueue,
    top: BucketQueue,
    bottom: BucketQueue,

    front: Vec<usize>,
    back: Vec<usize>,
}

impl Placement {
    fn enqueue(&mut self, v: usize) {
        self.stamp[v] = self.stamp[v].wrapping_add(1);
        let entry = (v, self.stamp[v]);
        let (indeg, outdeg) = (self.indeg[v], self.outdeg[v]);
        match self.role[v] {
            Role::Free => {
                if indeg == 0 {
                    self.sources.push_back(entry);
                } else if outdeg == 0 {
                    self.sinks.push_back(entry);
                } else {
                    self.free.push(entry.0, entry.1, outdeg - indeg);
                }
            }
            Role::Top => {
                if indeg == 0 {
                    self.sources.push_back(entry);
                } else {
                    self.top.push(entry.0, entry.1, (outdeg - indeg).min(0));
                }
            }
            Role::Bottom => {
                if outdeg == 0 {
                    self.sinks.push_back(entry);
                } else {
                    self.bottom.push(entry.0, entry.1, (indeg - outdeg).min(0));
                }
            }
            Role::Waiting | Role::Placed => {}
        }
    }

    fn activate(&mut self, class: usize, role: Role) {
        for i in 0..self.classes[class].len() {
            let v = self.classes[class][i];
            if self.role[v] != Role::Placed && self.role[v] != role {
                self.role[v] = role;
                self.enqueue(v);
            }
        }
    }

    /// Drop exhausted extreme classes and activate the new extremes.
    fn advance(&mut self) {
        while self.lo < self.hi && self.remaining[self.lo] == 0 {
            self.lo += 1;
        }
        while self.hi > self.lo && self.remaining[self.hi - 1] == 0 {
            self.hi -= 1;
        }
        match self.hi - self.lo {
            0 => {}
            1 => self.activate(self.lo, Role::Free),
            _ => {
                self.activate(self.lo, Role::Top);
                self.activate(self.hi - 1, Role::Bottom);
            }
        }
    }

    /// Next node to place and whether it goes to the front.
    fn pick(&mut self) -> Option<(usize, bool)> {
        if let Some(v) = pop_live(&mut self.sources, &self.stamp) {
            return Some((v, true));
        }
        if let Some(v) = pop_live(&mut self.sinks, &self.stamp) {
            return Some((v, false));
        }

        let candidates = [
            self.free.peek(&self.stamp).map(|(_, s)| (s, Role::Free)),
            self.top.peek(&self.stamp).map(|(_, s)| (s, Role::Top)),
            self.bottom.peek(&self.stamp).map(|(_, s)| (s, Role::Bottom)),
        ];
        let mut best: Option<(i64, Role)> = None;
        for (score, role) in candidates.into_iter().flatten() {
            if best.is_none_or(|(b, _)| score > b) {
                best = Some((score, role));
            }
        }
        let (score, role) = best?;
        match role {
            // Sink-leaning free nodes go to the back.
            Role::Free => self.free.pop(&self.stamp).map(|v| (v, score >= 0)),
            Role::Top => self.top.pop(&self.stamp).map(|v| (v, true)),
            _ => self.bottom.pop(&self.stamp).map(|v| (v, false)),
        }
    }

    fn place(&mut self, v: usize, at_front: bool) {
        self.role[v] = Role::Placed;
        self.stamp[v] = self.stamp[v].wrapping_add(1);
        if at_front {
            self.front.push(v);
        } else {
            self.back.push(v);
        }

        for (c, k) in std::mem::take(&mut self.children[v]) {
            if self.role[c] != Role::Placed {
                self.indeg[c] -= k;
                self.enqueue(c);
            }
        }
        for (p, k) in std::mem::take(&mut self.parents[v]) {
            if self.role[p] != Role::Placed {
                self.outdeg[p] -= k;
                self.enqueue(p);
            }
        }

        if let Some(class) = self.class[v] {
            self.remaining[class] -= 1;
            if self.remaining[class] == 0 {
                self.advance();
            }
        }
    }
}

/// Order `members` (slots closed under adjacency) so that links point forward wherever the
/// heuristic manages it, honoring `rank` strictly.
pub(crate) fn order<N, L, K, F>(graph: &Graph<N, L>, members: &[u32], mut rank: F) -> Vec<u32>
where
    K: Ord,
    F: FnMut(NodeRef<'_, N, L>) -> Option<K>,
{
    let n = members.len();
    if n == 0 {
        return Vec::new();
    }
    let entries = graph.entries();
    let local: HashMap<u32, usize> = members
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();

    let mut children: Vec<Vec<(usize, i64)>> = Vec::with_capacity(n);
    let mut parents: Vec<Vec<(usize, i64)>> = Vec::with_capacity(n);
    for &v in members {
        let entry = &entries[v as usize];
        let project = |adj: &Adjacency| -> Vec<(usize, i64)> {
            adj.iter()
                .filter_map(|(w, links)| local.get(w).map(|&i| (i, links.len() as i64)))
                .collect()
        };
        children.push(project(&entry.children));
        parents.push(project(&entry.parents));
    }
    let outdeg: Vec<i64> = children.iter().map(|c| c.iter().map(|e| e.1).sum()).collect();
    let indeg: Vec<i64> = parents.iter().map(|p| p.iter().map(|e| e.1).sum()).collect();
    let span = outdeg
        .iter()
        .chain(indeg.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(0) as usize;

    let mut ranked: Vec<(K, usize)> = Vec::new();
    let mut role: Vec<Role> = vec![Role::Free; n];
    for (i, &v) in members.iter().enumerate() {
        if let Some(key) = graph.node_ref(v).and_then(&mut rank) {
            ranked.push((key, i));
            role[i] = Role::Waiting;
        }
    }
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    let mut classes: Vec<Vec<usize>> = Vec::new();
    let mut class: Vec<Option<usize>> = vec![None; n];
    let mut previous: Option<&K> = None;
    for (key, i) in &ranked {
        if previous != Some(key) {
            classes.push(Vec::new());
        }
        if let Some(members_of_class) = classes.last_mut() {
            members_of_class.push(*i);
        }
        class[*i] = Some(classes.len() - 1);
        previous = Some(key);
    }
    let remaining: Vec<usize> = classes.iter().map(Vec::len).collect();
    let hi = classes.len();

    let mut placement = Placement {
        children,
        parents,
        indeg,
        outdeg,
        role,
        stamp: vec![0; n],
        class,
        classes,
        remaining,
        lo: 0,
        hi,
        sources: VecDeque::new(),
        sinks: VecDeque::new(),
        free: BucketQueue::new(span),
        top: BucketQueue::new(span),
        bottom: BucketQueue::new(span),
        front: Vec::with_capacity(n),
        back: Vec::new(),
    };

    for v in 0..n {
        placement.enqueue(v);
    }
    placement.advance();

    for _ in 0..n {
        let Some((v, at_front)) = placement.pick() else {
            debug_assert!(false, "no active node while nodes remain");
            break;
        };
        placement.place(v, at_front);
    }

    let Placement {
        mut front,
        back,
        role,
        ..
    } = placement;
    tracing::trace!(
        nodes = n,
        front = front.len(),
        back = back.len(),
        classes = hi,
        "topological order"
    );
    front.extend(back.into_iter().rev());
    if front.len() < n {
        front.extend((0..n).filter(|&v| role[v] != Role::Placed));
    }
    front.into_iter().map(|i| members[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_queue_pops_highest_score_first_in_first_out() {
        let mut q = BucketQueue::new(2);
        let stamps = vec![0u32; 4];
        q.push(0, 0, -1);
        q.push(1, 0, 2);
        q.push(2, 0, 2);
        q.push(3, 0, 0);
        assert_eq!(q.pop(&stamps), Some(1));
        assert_eq!(q.pop(&stamps), Some(2));
        assert_eq!(q.pop(&stamps), Some(3));
        assert_eq!(q.pop(&stamps), Some(0));
        assert_eq!(q.pop(&stamps), None);
    }

    #[test]
    fn bucket_queue_skips_stale_entries() {
        let mut q = BucketQueue::new(1);
        let mut stamps = vec![0u32; 2];
        q.push(0, 0, 1);
        q.push(1, 0, 0);
        stamps[0] = 1;
        q.push(0, 1, -1);
        assert_eq!(q.peek(&stamps), Some((1, 0)));
        assert_eq!(q.pop(&stamps), Some(1));
        assert_eq!(q.pop(&stamps), Some(0));
        assert_eq!(q.pop(&stamps), None);
    }

    #[test]
    fn bucket_queue_clamps_out_of_range_scores() {
        let mut q = BucketQueue::new(1);
        let stamps = vec![0u32; 2];
        q.push(0, 0, -7);
        q.push(1, 0, 9);
        assert_eq!(q.peek(&stamps), Some((1, 1)));
        q.pop(&stamps);
        assert_eq!(q.peek(&stamps), Some((0, -1)));
    }
}
