//! Borrowed views of single nodes and links.

use super::Graph;
use super::alg::{self, Direction};
use super::entries::{Adjacency, LinkEntry, NodeEntry};
use super::handle::{LinkId, NodeId};
use crate::Point;
use crate::error::{Axis, Error, Result};

/// Read access to one live node.
///
/// A node also stands for its connected component: `nnodes`, `acyclic`, `roots`,
/// `topological` and friends answer for the component only.
pub struct NodeRef<'a, N, L> {
    graph: &'a Graph<N, L>,
    slot: u32,
    entry: &'a NodeEntry<N>,
    data: &'a N,
}

impl<N, L> Clone for NodeRef<'_, N, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, L> Copy for NodeRef<'_, N, L> {}

impl<N: std::fmt::Debug, L> std::fmt::Debug for NodeRef<'_, N, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("data", self.data)
            .field("x", &self.entry.x)
            .field("y", &self.entry.y)
            .finish()
    }
}

impl<'a, N, L> NodeRef<'a, N, L> {
    pub(crate) fn new(graph: &'a Graph<N, L>, slot: u32) -> Option<Self> {
        let entry = graph.entries().get(slot as usize)?;
        let data = entry.data.as_ref()?;
        Some(Self {
            graph,
            slot,
            entry,
            data,
        })
    }

    pub fn id(&self) -> NodeId {
        self.graph.node_id(self.slot)
    }

    pub fn data(&self) -> &'a N {
        self.data
    }

    pub fn x(&self) -> Result<f64> {
        self.entry.x.ok_or(Error::UnsetCoordinate { axis: Axis::X })
    }

    pub fn y(&self) -> Result<f64> {
        self.entry.y.ok_or(Error::UnsetCoordinate { axis: Axis::Y })
    }

    pub fn ux(&self) -> Option<f64> {
        self.entry.x
    }

    pub fn uy(&self) -> Option<f64> {
        self.entry.y
    }

    fn ids(&self, adjacency: &'a Adjacency) -> impl Iterator<Item = NodeId> + 'a {
        let graph = self.graph;
        adjacency.keys().map(move |&v| graph.node_id(v))
    }

    fn counts(&self, adjacency: &'a Adjacency) -> impl Iterator<Item = (NodeId, usize)> + 'a {
        let graph = self.graph;
        adjacency
            .iter()
            .map(move |(&v, links)| (graph.node_id(v), links.len()))
    }

    fn link_ids(&self, links: impl Iterator<Item = &'a u32> + 'a) -> impl Iterator<Item = LinkId> + 'a {
        let graph = self.graph;
        links.map(move |&l| graph.link_id(l))
    }

    /// Link slots in `adjacency` that lead to `other`; empty if `other` is not a live node of
    /// this graph.
    fn links_to(&self, adjacency: &'a Adjacency, other: NodeId) -> &'a [u32] {
        if !self.graph.contains_node(other) {
            return &[];
        }
        adjacency.get(&other.index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct parents, in order of their first link.
    pub fn parents(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.ids(&self.entry.parents)
    }

    /// Distinct children, in order of their first link.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.ids(&self.entry.children)
    }

    /// Parents with the number of links each one has to this node.
    pub fn parent_counts(&self) -> impl Iterator<Item = (NodeId, usize)> + 'a {
        self.counts(&self.entry.parents)
    }

    /// Children with the number of links this node has to each.
    pub fn child_counts(&self) -> impl Iterator<Item = (NodeId, usize)> + 'a {
        self.counts(&self.entry.children)
    }

    pub fn parent_links(&self) -> impl Iterator<Item = LinkId> + 'a {
        self.link_ids(self.entry.parents.values().flatten())
    }

    pub fn child_links(&self) -> impl Iterator<Item = LinkId> + 'a {
        self.link_ids(self.entry.children.values().flatten())
    }

    /// Links from `other` to this node.
    pub fn parent_links_to(&self, other: NodeId) -> impl Iterator<Item = LinkId> + 'a {
        self.link_ids(self.links_to(&self.entry.parents, other).iter())
    }

    /// Links from this node to `other`.
    pub fn child_links_to(&self, other: NodeId) -> impl Iterator<Item = LinkId> + 'a {
        self.link_ids(self.links_to(&self.entry.children, other).iter())
    }

    pub fn nparents(&self) -> usize {
        self.entry.parents.len()
    }

    pub fn nchildren(&self) -> usize {
        self.entry.children.len()
    }

    pub fn nparent_links(&self) -> usize {
        self.entry.nparent_links
    }

    pub fn nchild_links(&self) -> usize {
        self.entry.nchild_links
    }

    pub fn nparent_links_to(&self, other: NodeId) -> usize {
        self.links_to(&self.entry.parents, other).len()
    }

    pub fn nchild_links_to(&self, other: NodeId) -> usize {
        self.links_to(&self.entry.children, other).len()
    }

    /// This node and everything it can be reached from, depth-first.
    pub fn ancestors(&self) -> Vec<NodeId> {
        self.walk(Direction::Parents)
    }

    /// This node and everything reachable from it, depth-first.
    pub fn descendants(&self) -> Vec<NodeId> {
        self.walk(Direction::Children)
    }

    fn walk(&self, dir: Direction) -> Vec<NodeId> {
        alg::reachable(self.graph.entries(), self.slot, dir)
            .into_iter()
            .map(|v| self.graph.node_id(v))
            .collect()
    }

    /// Every node of this node's component, breadth-first from this node.
    pub fn component_nodes(&self) -> Vec<NodeId> {
        self.graph
            .component_slots(self.slot)
            .into_iter()
            .map(|v| self.graph.node_id(v))
            .collect()
    }

    pub fn nnodes(&self) -> usize {
        self.graph.component_nnodes(self.slot)
    }

    pub fn nlinks(&self) -> usize {
        self.graph.component_nlinks(self.slot)
    }

    pub fn multi(&self) -> bool {
        self.graph.component_multi(self.slot)
    }

    pub fn acyclic(&self) -> bool {
        self.graph.component_acyclic(self.slot)
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.graph.component_sources(self.slot, Direction::Children)
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.graph.component_sources(self.slot, Direction::Parents)
    }

    pub fn topological(&self) -> Vec<NodeId> {
        self.topological_by(|_| None::<()>)
    }

    pub fn topological_by<K, F>(&self, rank: F) -> Vec<NodeId>
    where
        K: Ord,
        F: FnMut(NodeRef<'_, N, L>) -> Option<K>,
    {
        let members = self.graph.component_slots(self.slot);
        crate::topological::order(self.graph, &members, rank)
            .into_iter()
            .map(|v| self.graph.node_id(v))
            .collect()
    }
}

/// Write access to one live node's payload and coordinates.
#[derive(Debug)]
pub struct NodeMut<'a, N> {
    id: NodeId,
    data: &'a mut N,
    x: &'a mut Option<f64>,
    y: &'a mut Option<f64>,
}

impl<'a, N> NodeMut<'a, N> {
    pub(crate) fn new(id: NodeId, entry: &'a mut NodeEntry<N>) -> Option<Self> {
        let NodeEntry {
            data: Some(data),
            x,
            y,
            ..
        } = entry
        else {
            return None;
        };
        Some(Self { id, data, x, y })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &N {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut N {
        &mut *self.data
    }

    pub fn x(&self) -> Result<f64> {
        self.x.ok_or(Error::UnsetCoordinate { axis: Axis::X })
    }

    pub fn y(&self) -> Result<f64> {
        self.y.ok_or(Error::UnsetCoordinate { axis: Axis::Y })
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        *self.x = Some(x);
        self
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        *self.y = Some(y);
        self
    }

    pub fn set_ux(&mut self, x: Option<f64>) -> &mut Self {
        *self.x = x;
        self
    }

    pub fn set_uy(&mut self, y: Option<f64>) -> &mut Self {
        *self.y = y;
        self
    }

    pub fn clear_coordinates(&mut self) -> &mut Self {
        *self.x = None;
        *self.y = None;
        self
    }
}

/// Read access to one live link.
pub struct LinkRef<'a, N, L> {
    graph: &'a Graph<N, L>,
    slot: u32,
    entry: &'a LinkEntry<L>,
    data: &'a L,
}

impl<N, L> Clone for LinkRef<'_, N, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, L> Copy for LinkRef<'_, N, L> {}

impl<N, L: std::fmt::Debug> std::fmt::Debug for LinkRef<'_, N, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkRef")
            .field("id", &self.id())
            .field("source", &self.source())
            .field("target", &self.target())
            .field("data", self.data)
            .finish()
    }
}

impl<'a, N, L> LinkRef<'a, N, L> {
    pub(crate) fn new(graph: &'a Graph<N, L>, slot: u32) -> Option<Self> {
        let entry = graph.link_entry(slot)?;
        let data = entry.data.as_ref()?;
        Some(Self {
            graph,
            slot,
            entry,
            data,
        })
    }

    pub fn id(&self) -> LinkId {
        self.graph.link_id(self.slot)
    }

    pub fn source(&self) -> NodeId {
        self.graph.node_id(self.entry.source)
    }

    pub fn target(&self) -> NodeId {
        self.graph.node_id(self.entry.target)
    }

    pub fn data(&self) -> &'a L {
        self.data
    }

    /// Control points, empty until a routing stage fills them in.
    pub fn points(&self) -> &'a [Point] {
        &self.entry.points
    }
}

/// Write access to one live link's payload and geometry.
#[derive(Debug)]
pub struct LinkMut<'a, L> {
    id: LinkId,
    data: &'a mut L,
    points: &'a mut Vec<Point>,
}

impl<'a, L> LinkMut<'a, L> {
    pub(crate) fn new(id: LinkId, entry: &'a mut LinkEntry<L>) -> Option<Self> {
        let LinkEntry {
            data: Some(data),
            points,
            ..
        } = entry
        else {
            return None;
        };
        Some(Self { id, data, points })
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn data(&self) -> &L {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut L {
        &mut *self.data
    }

    pub fn points(&self) -> &[Point] {
        self.points.as_slice()
    }

    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut *self.points
    }

    pub fn set_points(&mut self, points: impl IntoIterator<Item = Point>) -> &mut Self {
        self.points.clear();
        self.points.extend(points);
        self
    }
}
