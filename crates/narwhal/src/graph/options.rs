//! Graph configuration options.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    /// Number of node slots to preallocate.
    pub node_capacity: usize,
    /// Number of link slots to preallocate.
    pub link_capacity: usize,
    /// Reuse the slots of deleted nodes and links. When off, arena order is creation order.
    pub recycle_slots: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            node_capacity: 0,
            link_capacity: 0,
            recycle_slots: true,
        }
    }
}
