//! Generation-checked handles into a [`Graph`](super::Graph) arena.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of one `Graph` instance. Handles remember which graph minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u32);

impl GraphId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Handle to a node. Valid until the node is deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) graph: GraphId,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn graph(self) -> GraphId {
        self.graph
    }

    /// Arena slot of the node. Slots of deleted nodes may be reused.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}@g{}", self.index, self.generation, self.graph.0)
    }
}

/// Handle to a link. Valid until the link, or one of its endpoints, is deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId {
    pub(crate) graph: GraphId,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl LinkId {
    pub fn graph(self) -> GraphId {
        self.graph
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}v{}@g{}", self.index, self.generation, self.graph.0)
    }
}
