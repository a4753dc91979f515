//! Arena slots for [`Graph`](super::Graph).
//!
//! A slot whose payload is `None` is a tombstone. Its generation has already been bumped, so every
//! handle minted for the previous occupant is rejected.

use crate::Point;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Neighbor slot -> link slots, in first-link order. Parallel links share one key.
pub(crate) type Adjacency = IndexMap<u32, Vec<u32>, FxBuildHasher>;

#[derive(Debug, Clone)]
pub(crate) struct NodeEntry<N> {
    pub(crate) generation: u32,
    pub(crate) data: Option<N>,
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) children: Adjacency,
    pub(crate) parents: Adjacency,
    pub(crate) nchild_links: usize,
    pub(crate) nparent_links: usize,
}

impl<N> NodeEntry<N> {
    pub(crate) fn new(data: N) -> Self {
        Self {
            generation: 0,
            data: Some(data),
            x: None,
            y: None,
            children: Adjacency::default(),
            parents: Adjacency::default(),
            nchild_links: 0,
            nparent_links: 0,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.data.is_some()
    }

    /// Refill a tombstone, keeping its generation.
    pub(crate) fn revive(&mut self, data: N) {
        debug_assert!(!self.is_live(), "reviving a live node slot");
        debug_assert!(self.children.is_empty() && self.parents.is_empty());
        self.data = Some(data);
    }

    pub(crate) fn bury(&mut self) {
        self.data = None;
        self.x = None;
        self.y = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Link slots to and from this node, children first.
    pub(crate) fn incident_links(&self) -> Vec<u32> {
        self.children
            .values()
            .chain(self.parents.values())
            .flatten()
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LinkEntry<L> {
    pub(crate) generation: u32,
    pub(crate) source: u32,
    pub(crate) target: u32,
    pub(crate) data: Option<L>,
    pub(crate) points: Vec<Point>,
}

impl<L> LinkEntry<L> {
    pub(crate) fn new(source: u32, target: u32, data: L) -> Self {
        Self {
            generation: 0,
            source,
            target,
            data: Some(data),
            points: Vec::new(),
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn revive(&mut self, source: u32, target: u32, data: L) {
        debug_assert!(!self.is_live(), "reviving a live link slot");
        self.source = source;
        self.target = target;
        self.data = Some(data);
    }

    pub(crate) fn bury(&mut self) {
        self.data = None;
        self.points.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Detach `link` from the `neighbor` bucket of `adjacency`, dropping the bucket once empty.
/// Returns whether the link was present.
pub(crate) fn detach(adjacency: &mut Adjacency, neighbor: u32, link: u32) -> bool {
    let Some(links) = adjacency.get_mut(&neighbor) else {
        return false;
    };
    let Some(pos) = links.iter().position(|&l| l == link) else {
        return false;
    };
    links.remove(pos);
    if links.is_empty() {
        adjacency.shift_remove(&neighbor);
    }
    true
}
