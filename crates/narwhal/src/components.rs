//! Union-find component cache.
//!
//! Every node slot has a union-find parent. The root of each tree is the component's
//! representative and is the only slot holding a [`Summary`]. Link insertion keeps summaries
//! exact by direct arithmetic. Link and node deletion never split anything eagerly: the touched
//! endpoints go into the dirty set and the next component query drains that set, re-walking each
//! affected component once.
//!
//! Draining is all-or-nothing: until every dirty node has been swept, nodes of a touched
//! component may chain through any of its slots, including deleted ones.

use crate::graph::alg::{self, Direction};
use crate::graph::entries::NodeEntry;
use rustc_hash::FxBuildHasher;

type IndexSet<T> = indexmap::IndexSet<T, FxBuildHasher>;

/// A lazily computed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cached<T> {
    Known(T),
    Dirty,
}

/// Aggregate facts about one component, stored at its representative.
#[derive(Debug, Clone)]
pub(crate) struct Summary {
    pub(crate) nnodes: usize,
    pub(crate) nlinks: usize,
    /// Links beyond the first between the same ordered pair.
    pub(crate) multis: usize,
    pub(crate) acyclic: Cached<bool>,
    pub(crate) roots: Cached<Vec<u32>>,
    pub(crate) leaves: Cached<Vec<u32>>,
}

impl Summary {
    fn singleton(v: u32) -> Self {
        Self {
            nnodes: 1,
            nlinks: 0,
            multis: 0,
            acyclic: Cached::Known(true),
            roots: Cached::Known(vec![v]),
            leaves: Cached::Known(vec![v]),
        }
    }

    fn counted(nnodes: usize, nlinks: usize, multis: usize) -> Self {
        Self {
            nnodes,
            nlinks,
            multis,
            acyclic: Cached::Dirty,
            roots: Cached::Dirty,
            leaves: Cached::Dirty,
        }
    }

    fn merge(a: &Summary, b: &Summary) -> Self {
        let acyclic = match (&a.acyclic, &b.acyclic) {
            (Cached::Known(false), _) | (_, Cached::Known(false)) => Cached::Known(false),
            // One bridging link cannot close a cycle.
            (Cached::Known(true), Cached::Known(true)) => Cached::Known(true),
            _ => Cached::Dirty,
        };
        Self {
            acyclic,
            ..Self::counted(a.nnodes + b.nnodes, a.nlinks + b.nlinks + 1, a.multis + b.multis)
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Forest {
    parent: Vec<u32>,
    /// `Some` only at representatives; `Dirty` until the next drain re-walks the component.
    summaries: Vec<Option<Cached<Summary>>>,
    reps: IndexSet<u32>,
    dirty: IndexSet<u32>,
    /// Deleted node slots that live union-find chains may still pass through.
    retired: Vec<u32>,
}

impl Forest {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            summaries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Register a fresh or revived node slot as a singleton component.
    pub(crate) fn insert(&mut self, v: u32) {
        let i = v as usize;
        debug_assert!(i <= self.parent.len(), "node slots are allocated densely");
        if i == self.parent.len() {
            self.parent.push(v);
            self.summaries.push(None);
        } else {
            self.parent[i] = v;
        }
        self.summaries[i] = Some(Cached::Known(Summary::singleton(v)));
        self.reps.insert(v);
    }

    pub(crate) fn find(&mut self, v: u32) -> u32 {
        let mut root = v;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = v;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    fn known_mut(&mut self, rep: u32) -> Option<&mut Summary> {
        match self.summaries.get_mut(rep as usize) {
            Some(Some(Cached::Known(s))) => Some(s),
            _ => None,
        }
    }

    fn invalidate(&mut self, rep: u32) {
        if let Some(Some(summary)) = self.summaries.get_mut(rep as usize) {
            *summary = Cached::Dirty;
        }
    }

    /// Account for a new link `source -> target`. `parallel` is set when an older link already
    /// joins the same ordered pair.
    pub(crate) fn link(&mut self, source: u32, target: u32, parallel: bool) {
        let rs = self.find(source);
        let rt = self.find(target);

        if self.known_mut(rs).is_none() || self.known_mut(rt).is_none() {
            // Pending deletions: let the drain sort it out.
            self.invalidate(rs);
            self.invalidate(rt);
            self.dirty.insert(source);
            self.dirty.insert(target);
            return;
        }

        if rs == rt {
            let Some(summary) = self.known_mut(rs) else {
                return;
            };
            summary.nlinks += 1;
            if parallel {
                summary.multis += 1;
            }
            summary.acyclic = match summary.acyclic {
                Cached::Known(false) => Cached::Known(false),
                // A copy of an existing link cannot close a new cycle.
                Cached::Known(true) if parallel => Cached::Known(true),
                _ => Cached::Dirty,
            };
            summary.roots = Cached::Dirty;
            summary.leaves = Cached::Dirty;
            return;
        }

        debug_assert!(!parallel, "parallel link between different components");
        let (Some(Cached::Known(a)), Some(Cached::Known(b))) = (
            self.summaries[rs as usize].take(),
            self.summaries[rt as usize].take(),
        ) else {
            debug_assert!(false, "representative lost its summary during union");
            return;
        };
        let (big, small) = if a.nnodes >= b.nnodes { (rs, rt) } else { (rt, rs) };
        self.parent[small as usize] = big;
        self.reps.swap_remove(&small);
        self.summaries[big as usize] = Some(Cached::Known(Summary::merge(&a, &b)));
    }

    /// Account for a removed link between `source` and `target`.
    pub(crate) fn unlink(&mut self, source: u32, target: u32) {
        let rs = self.find(source);
        let rt = self.find(target);
        self.invalidate(rs);
        self.invalidate(rt);
        self.dirty.insert(source);
        self.dirty.insert(target);
    }

    /// Drop a node whose links are already gone. The slot stays retired until [`Forest::reclaim`].
    pub(crate) fn remove(&mut self, v: u32, retire: bool) {
        self.dirty.swap_remove(&v);
        if self.reps.swap_remove(&v) {
            self.summaries[v as usize] = None;
        }
        if retire {
            self.retired.push(v);
        }
    }

    /// Retired slots that are safe to reuse: nothing can chain through them once every pending
    /// resweep has run.
    pub(crate) fn reclaim(&mut self) -> Vec<u32> {
        if !self.dirty.is_empty() || self.retired.is_empty() {
            return Vec::new();
        }
        tracing::trace!(slots = self.retired.len(), "reclaiming retired node slots");
        std::mem::take(&mut self.retired)
    }

    /// Re-walk every component touched since the last drain.
    pub(crate) fn drain<N>(&mut self, nodes: &[NodeEntry<N>]) {
        while let Some(v) = self.dirty.pop() {
            if !nodes[v as usize].is_live() {
                debug_assert!(false, "deleted node {v} left in the dirty set");
                continue;
            }
            self.sweep(nodes, v);
        }
    }

    /// Walk the component of `start`, make `start` its representative and recount it.
    fn sweep<N>(&mut self, nodes: &[NodeEntry<N>], start: u32) {
        let members = alg::component(nodes, start);
        let mut nlinks = 0usize;
        let mut multis = 0usize;
        for &v in &members {
            if v != start {
                self.dirty.swap_remove(&v);
                if self.reps.swap_remove(&v) {
                    self.summaries[v as usize] = None;
                }
            }
            self.parent[v as usize] = start;
            for links in nodes[v as usize].children.values() {
                nlinks += links.len();
                multis += links.len().saturating_sub(1);
            }
        }
        tracing::trace!(
            start,
            nnodes = members.len(),
            nlinks,
            multis,
            "resweeping component"
        );
        self.summaries[start as usize] =
            Some(Cached::Known(Summary::counted(members.len(), nlinks, multis)));
        self.reps.insert(start);
    }

    /// Drain pending work and return the representative of `v`, whose summary is then known.
    fn settle<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> u32 {
        self.drain(nodes);
        let rep = self.find(v);
        if self.known_mut(rep).is_some() {
            return rep;
        }
        debug_assert!(false, "representative {rep} has no summary after draining");
        self.sweep(nodes, v);
        v
    }

    /// Representatives, one per component.
    pub(crate) fn split<N>(&mut self, nodes: &[NodeEntry<N>]) -> Vec<u32> {
        self.drain(nodes);
        self.reps.iter().copied().collect()
    }

    pub(crate) fn summary<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> Option<&mut Summary> {
        let rep = self.settle(nodes, v);
        self.known_mut(rep)
    }

    pub(crate) fn nnodes<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> usize {
        self.summary(nodes, v).map_or(1, |s| s.nnodes)
    }

    pub(crate) fn nlinks<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> usize {
        self.summary(nodes, v).map_or(0, |s| s.nlinks)
    }

    pub(crate) fn multi<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> bool {
        self.summary(nodes, v).is_some_and(|s| s.multis > 0)
    }

    pub(crate) fn acyclic<N>(&mut self, nodes: &[NodeEntry<N>], v: u32) -> bool {
        let rep = self.settle(nodes, v);
        let Some(summary) = self.known_mut(rep) else {
            return alg::is_acyclic(nodes, &alg::component(nodes, v));
        };
        if let Cached::Known(acyclic) = summary.acyclic {
            return acyclic;
        }
        let acyclic = alg::is_acyclic(nodes, &alg::component(nodes, rep));
        summary.acyclic = Cached::Known(acyclic);
        acyclic
    }

    /// Roots (`Direction::Children`) or leaves (`Direction::Parents`) of the component of `v`.
    pub(crate) fn sources<N>(&mut self, nodes: &[NodeEntry<N>], v: u32, dir: Direction) -> Vec<u32> {
        let rep = self.settle(nodes, v);
        let Some(summary) = self.known_mut(rep) else {
            return alg::sources(nodes, &alg::component(nodes, v), dir);
        };
        let slot = match dir {
            Direction::Children => &mut summary.roots,
            Direction::Parents => &mut summary.leaves,
        };
        if let Cached::Known(found) = slot {
            return found.clone();
        }
        let found = alg::sources(nodes, &alg::component(nodes, rep), dir);
        *slot = Cached::Known(found.clone());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_compresses_paths_to_the_root() {
        let mut forest = Forest::default();
        for v in 0..4 {
            forest.insert(v);
        }
        forest.parent[1] = 0;
        forest.parent[2] = 1;
        forest.parent[3] = 2;

        assert_eq!(forest.find(3), 0);
        assert_eq!(forest.parent[3], 0);
        assert_eq!(forest.parent[2], 0);
    }

    #[test]
    fn merge_keeps_a_known_cycle() {
        let cyclic = Summary {
            acyclic: Cached::Known(false),
            ..Summary::counted(2, 2, 0)
        };
        let unknown = Summary::counted(3, 2, 1);
        let merged = Summary::merge(&cyclic, &unknown);
        assert_eq!(merged.acyclic, Cached::Known(false));
        assert_eq!(merged.nnodes, 5);
        assert_eq!(merged.nlinks, 5);
        assert_eq!(merged.multis, 1);
    }

    #[test]
    fn merge_of_two_acyclic_components_is_acyclic() {
        let merged = Summary::merge(&Summary::singleton(0), &Summary::singleton(1));
        assert_eq!(merged.acyclic, Cached::Known(true));
        assert_eq!(merged.roots, Cached::Dirty);
    }

    #[test]
    fn merge_with_an_unknown_side_is_unknown() {
        let merged = Summary::merge(&Summary::singleton(0), &Summary::counted(2, 1, 0));
        assert_eq!(merged.acyclic, Cached::Dirty);
    }

    #[test]
    fn union_folds_the_smaller_component_into_the_larger() {
        let mut forest = Forest::default();
        for v in 0..3 {
            forest.insert(v);
        }
        forest.link(1, 2, false);
        let big = forest.find(1);
        forest.link(0, 1, false);
        assert_eq!(forest.find(0), big);
        assert_eq!(forest.reps.len(), 1);
    }
}
