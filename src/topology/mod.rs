//! Physical topology: node positions, adjacency and directed links.
//!
//! The topology is fixed once the run starts. It answers two questions for
//! the kernel: where a node is, and how long a packet takes on the link
//! between two physical neighbors. Protocol code never sees the adjacency
//! table; it learns its neighbors from hello traffic.

pub mod link;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::geo::Point;
use crate::node::NodeId;
use crate::registry::Registry;

pub use link::{DistanceLink, Link, LinkCtor, LinkEnds, SimpleLink, DISTANCE_LINK, SIMPLE_LINK};

// ── NodeRecord ────────────────────────────────────────────────────────

/// The kernel's view of a node.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    id: NodeId,
    position: Point,
    phy_neighbors: BTreeSet<NodeId>,
}

impl NodeRecord {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Number of physical neighbors. The set itself stays kernel-private.
    pub fn degree(&self) -> usize {
        self.phy_neighbors.len()
    }
}

// ── Topology ──────────────────────────────────────────────────────────

/// Node table, link table and link kinds of one world.
pub struct Topology {
    nodes: BTreeMap<NodeId, NodeRecord>,
    links: BTreeMap<(NodeId, NodeId), Box<dyn Link>>,
    link_kinds: Registry<LinkCtor>,
}

impl Topology {
    /// An empty topology with no link kinds registered.
    pub fn new() -> Self {
        Topology {
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            link_kinds: Registry::new("link"),
        }
    }

    /// An empty topology with `simple` and `distance` links registered
    /// using the latencies in `config`.
    pub fn with_config(config: &SimConfig) -> Self {
        let mut topo = Self::new();
        let delay = config.one_hop_delay;
        let per_unit = config.ticks_per_unit;
        topo.link_kinds.register(
            SIMPLE_LINK,
            Box::new(move |e: &LinkEnds| Box::new(SimpleLink::new(e.from, e.to, delay)) as Box<dyn Link>),
        );
        topo.link_kinds.register(
            DISTANCE_LINK,
            Box::new(move |e: &LinkEnds| Box::new(DistanceLink::new(e, per_unit)) as Box<dyn Link>),
        );
        topo
    }

    pub fn link_kinds_mut(&mut self) -> &mut Registry<LinkCtor> {
        &mut self.link_kinds
    }

    pub fn link_kinds(&self) -> &Registry<LinkCtor> {
        &self.link_kinds
    }

    // ── Nodes ─────────────────────────────────────────────────────

    /// Add a node at `position`.
    ///
    /// Rejects the broadcast id and ids already present; an existing node
    /// is left untouched.
    pub fn insert_node(&mut self, id: NodeId, position: Point) -> SimResult<()> {
        if id.is_broadcast() {
            warn!("BROADCAST id cannot be used for a node");
            return Err(SimError::ReservedId);
        }
        if self.nodes.contains_key(&id) {
            warn!("duplicate node id {}", id);
            return Err(SimError::DuplicateNode(id));
        }
        self.nodes.insert(
            id,
            NodeRecord {
                id,
                position,
                phy_neighbors: BTreeSet::new(),
            },
        );
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(&id).map(|n| n.position)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    // ── Adjacency ─────────────────────────────────────────────────

    /// Record `nb` as a physical neighbor of `id` and create the directed
    /// link `id -> nb` of kind `link_kind`.
    ///
    /// Returns `Ok(false)` without changing anything on a self-loop, an
    /// unknown `nb`, or a relation that already exists. Call it in both
    /// directions for a bidirectional pair.
    pub fn add_phy_neighbor(&mut self, id: NodeId, nb: NodeId, link_kind: &str) -> SimResult<bool> {
        if id == nb || !self.nodes.contains_key(&nb) {
            return Ok(false);
        }
        let from_pos = self.position(id).ok_or(SimError::MissingTarget(id))?;
        if self.nodes[&id].phy_neighbors.contains(&nb) {
            return Ok(false);
        }
        if self.links.contains_key(&(id, nb)) {
            warn!("duplicate link id {} -> {}", id, nb);
            return Err(SimError::DuplicateLink { from: id, to: nb });
        }

        let ends = LinkEnds {
            from: id,
            to: nb,
            from_pos,
            to_pos: self.nodes[&nb].position,
        };
        let link = (self.link_kinds.get(link_kind)?)(&ends);
        debug!("link {} -> {} ({}, latency {})", id, nb, link.kind(), link.latency());
        self.links.insert((id, nb), link);
        if let Some(record) = self.nodes.get_mut(&id) {
            record.phy_neighbors.insert(nb);
        }
        Ok(true)
    }

    /// Drop the relation `id -> nb` and its link. The reverse direction is
    /// untouched.
    pub fn del_phy_neighbor(&mut self, id: NodeId, nb: NodeId) -> bool {
        let removed = self
            .nodes
            .get_mut(&id)
            .map(|n| n.phy_neighbors.remove(&nb))
            .unwrap_or(false);
        self.links.remove(&(id, nb));
        removed
    }

    /// Connect every pair of nodes at most `radius` apart, both directions.
    ///
    /// Returns the number of undirected pairs connected.
    pub fn connect_within(&mut self, radius: f64, link_kind: &str) -> SimResult<usize> {
        let ids = self.node_ids();
        let mut pairs = 0;
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[..i] {
                let (pa, pb) = (self.nodes[&a].position, self.nodes[&b].position);
                if pa.distance(pb) <= radius {
                    let forward = self.add_phy_neighbor(a, b, link_kind)?;
                    let backward = self.add_phy_neighbor(b, a, link_kind)?;
                    if forward || backward {
                        pairs += 1;
                    }
                }
            }
        }
        Ok(pairs)
    }

    /// Physical neighbors of `id`, ascending. Kernel use only.
    pub(crate) fn phy_neighbors(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.nodes.get(&id).map(|n| &n.phy_neighbors)
    }

    // ── Links ─────────────────────────────────────────────────────

    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&dyn Link> {
        self.links.get(&(from, to)).map(|l| l.as_ref())
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::with_config(&SimConfig::default())
    }
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("link_kinds", &self.link_kinds)
            .finish()
    }
}
