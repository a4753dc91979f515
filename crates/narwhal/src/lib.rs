#![forbid(unsafe_code)]

//! Mutable multigraph engine for layered graph layout.
//!
//! A [`Graph`] owns every node and link. Nodes and links are addressed through small `Copy`
//! handles ([`NodeId`], [`LinkId`]) that carry the owning graph's id and a slot generation, so a
//! handle that outlived its node (or belongs to another graph) is rejected instead of silently
//! aliasing a recycled slot.
//!
//! Connectivity, multi-edge and acyclicity facts are maintained incrementally in a union-find
//! forest and recomputed lazily after deletions. Layout stages consume the read surface
//! (`nodes`, `children`/`parents`, [`Graph::topological_by`]) and write back `x`/`y`.
//!
//! ```
//! use narwhal::Graph;
//!
//! let mut g: Graph<&str, ()> = Graph::new();
//! let a = g.add_node("a");
//! let b = g.add_node("b");
//! g.add_link(a, b, ()).unwrap();
//!
//! assert!(g.connected());
//! assert!(g.acyclic());
//! assert_eq!(g.roots(), vec![a]);
//! assert_eq!(g.topological(), vec![a, b]);
//! ```

mod components;
pub mod error;
pub mod graph;
mod topological;

pub use error::{Axis, Error, Result};
pub use graph::{Graph, GraphId, GraphOptions, LinkId, LinkMut, LinkRef, NodeId, NodeMut, NodeRef};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A control point of a routed link.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
