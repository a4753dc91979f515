//! Graph container.
//!
//! `Graph` is the only factory for nodes and links and the only place they are deleted. Nodes
//! and links live in arenas; the union-find forest that tracks components lives behind a
//! `RefCell` so that read queries can resolve pending work on `&self`.

pub(crate) mod alg;
pub(crate) mod entries;
mod handle;
mod options;
mod views;

pub use handle::{GraphId, LinkId, NodeId};
pub use options::GraphOptions;
pub use views::{LinkMut, LinkRef, NodeMut, NodeRef};

use crate::components::Forest;
use crate::error::{Error, Result};
use alg::Direction;
use entries::{LinkEntry, NodeEntry};
use std::cell::RefCell;
use std::fmt;

pub struct Graph<N, L> {
    id: GraphId,
    options: GraphOptions,

    nodes: Vec<NodeEntry<N>>,
    links: Vec<LinkEntry<L>>,
    free_nodes: Vec<u32>,
    free_links: Vec<u32>,

    nnodes: usize,
    nlinks: usize,

    forest: RefCell<Forest>,
}

impl<N, L> Default for Graph<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L> fmt::Debug for Graph<N, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nnodes", &self.nnodes)
            .field("nlinks", &self.nlinks)
            .finish_non_exhaustive()
    }
}

impl<N, L> Graph<N, L> {
    pub fn new() -> Self {
        Self::with_options(GraphOptions::default())
    }

    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            id: GraphId::next(),
            options,
            nodes: Vec::with_capacity(options.node_capacity),
            links: Vec::with_capacity(options.link_capacity),
            free_nodes: Vec::new(),
            free_links: Vec::new(),
            nnodes: 0,
            nlinks: 0,
            forest: RefCell::new(Forest::with_capacity(options.node_capacity)),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub(crate) fn entries(&self) -> &[NodeEntry<N>] {
        &self.nodes
    }

    pub(crate) fn node_id(&self, slot: u32) -> NodeId {
        NodeId {
            graph: self.id,
            index: slot,
            generation: self.nodes[slot as usize].generation,
        }
    }

    pub(crate) fn link_id(&self, slot: u32) -> LinkId {
        LinkId {
            graph: self.id,
            index: slot,
            generation: self.links[slot as usize].generation,
        }
    }

    pub(crate) fn link_entry(&self, slot: u32) -> Option<&LinkEntry<L>> {
        self.links.get(slot as usize)
    }

    pub(crate) fn node_ref(&self, slot: u32) -> Option<NodeRef<'_, N, L>> {
        NodeRef::new(self, slot)
    }

    /// Slot of a live node of this graph.
    fn check_node(&self, node: NodeId) -> Result<u32> {
        if node.graph != self.id {
            return Err(Error::ForeignNode);
        }
        match self.nodes.get(node.index as usize) {
            Some(entry) if entry.generation == node.generation && entry.is_live() => Ok(node.index),
            _ => Err(Error::StaleNode),
        }
    }

    fn check_link(&self, link: LinkId) -> Result<u32> {
        if link.graph != self.id {
            return Err(Error::ForeignLink);
        }
        match self.links.get(link.index as usize) {
            Some(entry) if entry.generation == link.generation && entry.is_live() => Ok(link.index),
            _ => Err(Error::StaleLink),
        }
    }

    pub fn add_node(&mut self, data: N) -> NodeId {
        if self.options.recycle_slots && self.free_nodes.is_empty() {
            self.free_nodes = self.forest.get_mut().reclaim();
        }
        let slot = match self.free_nodes.pop() {
            Some(slot) => {
                self.nodes[slot as usize].revive(data);
                slot
            }
            None => {
                let slot = self.nodes.len() as u32;
                self.nodes.push(NodeEntry::new(data));
                slot
            }
        };
        self.forest.get_mut().insert(slot);
        self.nnodes += 1;
        self.node_id(slot)
    }

    /// Create a node through an existing node handle. The new node joins `anchor`'s graph as a
    /// singleton component.
    pub fn add_node_beside(&mut self, anchor: NodeId, data: N) -> Result<NodeId> {
        self.check_node(anchor)?;
        Ok(self.add_node(data))
    }

    /// Add a link `source -> target`. Parallel links are allowed; self-loops are not.
    pub fn add_link(&mut self, source: NodeId, target: NodeId, data: L) -> Result<LinkId> {
        let s = self.check_node(source)?;
        let t = self.check_node(target)?;
        if s == t {
            return Err(Error::SelfLoop);
        }

        let parallel = self.nodes[s as usize].children.contains_key(&t);
        let slot = match self.options.recycle_slots.then(|| self.free_links.pop()).flatten() {
            Some(slot) => {
                self.links[slot as usize].revive(s, t, data);
                slot
            }
            None => {
                let slot = self.links.len() as u32;
                self.links.push(LinkEntry::new(s, t, data));
                slot
            }
        };

        let source_entry = &mut self.nodes[s as usize];
        source_entry.children.entry(t).or_default().push(slot);
        source_entry.nchild_links += 1;
        let target_entry = &mut self.nodes[t as usize];
        target_entry.parents.entry(s).or_default().push(slot);
        target_entry.nparent_links += 1;

        self.nlinks += 1;
        self.forest.get_mut().link(s, t, parallel);
        Ok(self.link_id(slot))
    }

    /// `node -> child`.
    pub fn add_child(&mut self, node: NodeId, child: NodeId, data: L) -> Result<LinkId> {
        self.add_link(node, child, data)
    }

    /// `parent -> node`.
    pub fn add_parent(&mut self, node: NodeId, parent: NodeId, data: L) -> Result<LinkId> {
        self.add_link(parent, node, data)
    }

    pub fn delete_link(&mut self, link: LinkId) -> Result<()> {
        let slot = self.check_link(link)?;
        self.unlink(slot);
        Ok(())
    }

    fn unlink(&mut self, slot: u32) {
        let entry = &mut self.links[slot as usize];
        let (s, t) = (entry.source, entry.target);
        entry.bury();
        if self.options.recycle_slots {
            self.free_links.push(slot);
        }

        let source_entry = &mut self.nodes[s as usize];
        if entries::detach(&mut source_entry.children, t, slot) {
            source_entry.nchild_links -= 1;
        } else {
            debug_assert!(false, "link {slot} missing from its source's children");
        }
        let target_entry = &mut self.nodes[t as usize];
        if entries::detach(&mut target_entry.parents, s, slot) {
            target_entry.nparent_links -= 1;
        } else {
            debug_assert!(false, "link {slot} missing from its target's parents");
        }

        self.nlinks -= 1;
        self.forest.get_mut().unlink(s, t);
    }

    /// Delete a node and every link touching it. Deleting an already deleted node is a no-op.
    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        let slot = match self.check_node(node) {
            Ok(slot) => slot,
            Err(Error::StaleNode) => return Ok(()),
            Err(err) => return Err(err),
        };
        for link in self.nodes[slot as usize].incident_links() {
            self.unlink(link);
        }
        self.nodes[slot as usize].bury();
        self.nnodes -= 1;
        self.forest
            .get_mut()
            .remove(slot, self.options.recycle_slots);
        Ok(())
    }

    pub fn get_mut(&mut self, node: NodeId) -> Result<NodeMut<'_, N>> {
        let slot = self.check_node(node)?;
        NodeMut::new(node, &mut self.nodes[slot as usize]).ok_or(Error::StaleNode)
    }

    pub fn get_link_mut(&mut self, link: LinkId) -> Result<LinkMut<'_, L>> {
        let slot = self.check_link(link)?;
        LinkMut::new(link, &mut self.links[slot as usize]).ok_or(Error::StaleLink)
    }

    pub fn get(&self, node: NodeId) -> Result<NodeRef<'_, N, L>> {
        let slot = self.check_node(node)?;
        self.node_ref(slot).ok_or(Error::StaleNode)
    }

    pub fn get_link(&self, link: LinkId) -> Result<LinkRef<'_, N, L>> {
        let slot = self.check_link(link)?;
        LinkRef::new(self, slot).ok_or(Error::StaleLink)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.check_node(node).is_ok()
    }

    pub fn contains_link(&self, link: LinkId) -> bool {
        self.check_link(link).is_ok()
    }

    /// Live nodes in slot order. Mutating the graph invalidates the iterator's view; collect
    /// first if you need to mutate while walking.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32)
            .filter(|&slot| self.nodes[slot as usize].is_live())
            .map(|slot| self.node_id(slot))
    }

    /// Live links in slot order.
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.links.len() as u32)
            .filter(|&slot| self.links[slot as usize].is_live())
            .map(|slot| self.link_id(slot))
    }

    pub fn nnodes(&self) -> usize {
        self.nnodes
    }

    pub fn nlinks(&self) -> usize {
        self.nlinks
    }

    fn live_slots(&self) -> Vec<u32> {
        (0..self.nodes.len() as u32)
            .filter(|&slot| self.nodes[slot as usize].is_live())
            .collect()
    }

    /// One node per connected component.
    pub fn split(&self) -> Vec<NodeId> {
        let reps = self.forest.borrow_mut().split(&self.nodes);
        reps.into_iter().map(|slot| self.node_id(slot)).collect()
    }

    /// Whether the graph is exactly one component. An empty graph is not connected.
    pub fn connected(&self) -> bool {
        self.forest.borrow_mut().split(&self.nodes).len() == 1
    }

    /// Whether some ordered pair of nodes is joined by two or more links.
    pub fn multi(&self) -> bool {
        let mut forest = self.forest.borrow_mut();
        let reps = forest.split(&self.nodes);
        reps.into_iter().any(|rep| forest.multi(&self.nodes, rep))
    }

    pub fn acyclic(&self) -> bool {
        let mut forest = self.forest.borrow_mut();
        let reps = forest.split(&self.nodes);
        reps.into_iter().all(|rep| forest.acyclic(&self.nodes, rep))
    }

    /// Nodes without parents, plus one member of every cycle nothing else leads into.
    pub fn roots(&self) -> Vec<NodeId> {
        self.sources(Direction::Children)
    }

    /// Nodes without children, plus one member of every cycle that leads nowhere else.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.sources(Direction::Parents)
    }

    fn sources(&self, dir: Direction) -> Vec<NodeId> {
        let found: Vec<u32> = {
            let mut forest = self.forest.borrow_mut();
            let reps = forest.split(&self.nodes);
            reps.into_iter()
                .flat_map(|rep| forest.sources(&self.nodes, rep, dir))
                .collect()
        };
        found.into_iter().map(|slot| self.node_id(slot)).collect()
    }

    /// Every node, ordered so that links point forward wherever possible.
    pub fn topological(&self) -> Vec<NodeId> {
        self.topological_by(|_| None::<()>)
    }

    /// Like [`Graph::topological`], but nodes with a rank are ordered by it strictly: if
    /// `rank(a) < rank(b)` then `a` comes before `b`, whatever the links say.
    ///
    /// Ranks must be totally ordered. Floating-point ranks need a wrapper whose `Ord` goes
    /// through [`f64::total_cmp`].
    pub fn topological_by<K, F>(&self, rank: F) -> Vec<NodeId>
    where
        K: Ord,
        F: FnMut(NodeRef<'_, N, L>) -> Option<K>,
    {
        let members = self.live_slots();
        crate::topological::order(self, &members, rank)
            .into_iter()
            .map(|slot| self.node_id(slot))
            .collect()
    }

    // Component-scoped queries, shared with `NodeRef`.

    pub(crate) fn component_slots(&self, slot: u32) -> Vec<u32> {
        alg::component(&self.nodes, slot)
    }

    pub(crate) fn component_nnodes(&self, slot: u32) -> usize {
        self.forest.borrow_mut().nnodes(&self.nodes, slot)
    }

    pub(crate) fn component_nlinks(&self, slot: u32) -> usize {
        self.forest.borrow_mut().nlinks(&self.nodes, slot)
    }

    pub(crate) fn component_multi(&self, slot: u32) -> bool {
        self.forest.borrow_mut().multi(&self.nodes, slot)
    }

    pub(crate) fn component_acyclic(&self, slot: u32) -> bool {
        self.forest.borrow_mut().acyclic(&self.nodes, slot)
    }

    pub(crate) fn component_sources(&self, slot: u32, dir: Direction) -> Vec<NodeId> {
        let found = self.forest.borrow_mut().sources(&self.nodes, slot, dir);
        found.into_iter().map(|v| self.node_id(v)).collect()
    }
}
