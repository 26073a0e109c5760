//! `NodeRuntime`: owns the nodes, the topology and the packet factory,
//! and turns kernel events into node-level send and receive.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{Event, EventType, Transfer, RECV_EVENT};
use crate::geo::Point;
use crate::packet::PacketFactory;
use crate::registry::Registry;
use crate::simulation::{EventHandler, SimulationContext};
use crate::topology::Topology;

use super::id::NodeId;
use super::trace::{trace_hash, TraceEntry, TraceRole};
use super::traits::{NodeContext, NodeCtor, SimNode};

/// Manages the simulated nodes and dispatches events to them.
///
/// Implements [`EventHandler`] so it can be passed directly to
/// [`Simulation::start_simulate`](crate::simulation::Simulation::start_simulate).
pub struct NodeRuntime {
    nodes: BTreeMap<NodeId, Box<dyn SimNode>>,
    node_kinds: Registry<NodeCtor>,
    topology: Topology,
    factory: PacketFactory,
    config: SimConfig,
    /// Append-only trace of every dispatched event.
    trace: Vec<TraceEntry>,
}

impl NodeRuntime {
    /// An empty runtime with the built-in link and packet kinds.
    pub fn new(config: SimConfig) -> Self {
        NodeRuntime {
            nodes: BTreeMap::new(),
            node_kinds: Registry::new("node"),
            topology: Topology::with_config(&config),
            factory: PacketFactory::with_protocol_kinds(),
            config,
            trace: Vec::new(),
        }
    }

    pub fn register_node_kind(&mut self, kind: impl Into<String>, ctor: Box<NodeCtor>) {
        self.node_kinds.register(kind, ctor);
    }

    pub fn node_kinds(&self) -> &Registry<NodeCtor> {
        &self.node_kinds
    }

    /// Create a node of `kind` at `position`.
    ///
    /// Nothing is created if the kind is unknown, the id is the broadcast
    /// id, or the id is taken.
    pub fn add_node(&mut self, kind: &str, id: NodeId, position: Point) -> SimResult<()> {
        let ctor = self.node_kinds.get(kind)?;
        self.topology.insert_node(id, position)?;
        let node = ctor(id);
        debug!("node {} ({}) at {}", id, kind, position);
        self.nodes.insert(id, node);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Downcast a node reference for inspection.
    ///
    /// Returns `None` if the node is not registered or has a wrong type.
    pub fn node<T: SimNode + 'static>(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(&id)?.as_any().downcast_ref::<T>()
    }

    pub fn node_mut<T: SimNode + 'static>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(&id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    pub fn factory(&self) -> &PacketFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut PacketFactory {
        &mut self.factory
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn trace_hash(&self) -> u64 {
        trace_hash(&self.trace)
    }

    fn record(&mut self, entry: TraceEntry) {
        if self.config.record_trace {
            self.trace.push(entry);
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────

    /// Fan `transfer.packet` out from `transfer.sender` to every physical
    /// neighbor matching `header.nex`. The input packet is dropped.
    fn send(&mut self, ctx: &mut SimulationContext, transfer: Transfer) {
        let Transfer { sender, packet, .. } = transfer;
        self.record(TraceEntry::new(ctx.now(), TraceRole::Send, sender, &packet));

        let Some(neighbors) = self.topology.phy_neighbors(sender) else {
            warn!("send: {}", SimError::MissingTarget(sender));
            return;
        };
        let nex = packet.header().nex;

        for &nb in neighbors {
            if !nex.is_broadcast() && nb != nex {
                continue;
            }
            let Some(link) = self.topology.link(sender, nb) else {
                warn!("send: {}", SimError::MissingLink { from: sender, to: nb });
                continue;
            };
            let replica = match self.factory.replicate(&packet) {
                Ok(p) => p,
                Err(e) => {
                    warn!("send: {}", e);
                    return;
                }
            };
            let at = ctx.now().saturating_plus(link.latency());
            if let Err(e) = ctx.schedule_at(RECV_EVENT, at, Transfer::new(sender, nb, replica)) {
                warn!("send: {}", e);
            }
        }
    }

    /// Run the receiver's handler on the packet, then drop it.
    fn recv(&mut self, ctx: &mut SimulationContext, transfer: Transfer) {
        let Transfer { receiver, mut packet, .. } = transfer;
        self.record(TraceEntry::new(ctx.now(), TraceRole::Recv, receiver, &packet));

        let NodeRuntime {
            nodes,
            topology,
            factory,
            config,
            ..
        } = self;
        let (Some(node), Some(position)) = (nodes.get_mut(&receiver), topology.position(receiver)) else {
            warn!("recv: {}", SimError::MissingTarget(receiver));
            return;
        };

        let mut node_ctx = NodeContext {
            sim: ctx,
            topology,
            factory,
            config,
            self_id: receiver,
            position,
        };
        if let Err(e) = node.recv_handler(&mut node_ctx, &mut packet) {
            warn!("{} at {}: {}", packet.id(), receiver, e);
        }
    }
}

impl EventHandler for NodeRuntime {
    fn handle(&mut self, ctx: &mut SimulationContext, event: Event) {
        match event.payload {
            EventType::Send(t) => self.send(ctx, t),
            EventType::Recv(t) => self.recv(ctx, t),
        }
    }
}

impl std::fmt::Debug for NodeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRuntime")
            .field("nodes", &self.nodes.len())
            .field("topology", &self.topology)
            .field("factory", &self.factory)
            .field("trace", &self.trace.len())
            .finish()
    }
}
