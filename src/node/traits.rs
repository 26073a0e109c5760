//! `SimNode` trait and the `NodeContext` a node sees while handling a packet.

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{EventId, Transfer, SEND_EVENT};
use crate::geo::Point;
use crate::packet::{Packet, PacketFactory};
use crate::simulation::SimulationContext;
use crate::time::VirtualTime;
use crate::topology::Topology;

use super::id::NodeId;

// ── SimNode ───────────────────────────────────────────────────────────

/// Trait implemented by every simulated node.
///
/// The runtime calls `recv_handler` for each packet delivered to the node
/// and drops the packet afterwards. A node that wants to keep a packet
/// must replicate it; a node that wants to transmit one calls
/// [`NodeContext::send_handler`].
///
/// # Example
///
/// ```rust
/// use geosim::node::{NodeContext, SimNode};
/// use geosim::packet::Packet;
/// use geosim::SimResult;
///
/// struct Counter { seen: u32 }
///
/// impl SimNode for Counter {
///     fn recv_handler(&mut self, _ctx: &mut NodeContext, _packet: &mut Packet) -> SimResult<()> {
///         self.seen += 1;
///         Ok(())
///     }
///     fn as_any(&self) -> &dyn std::any::Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
/// }
/// ```
pub trait SimNode {
    /// React to a delivered packet.
    fn recv_handler(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()>;

    /// Downcast support for `NodeRuntime::node::<T>()`.
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Builds a node for a given id.
pub type NodeCtor = dyn Fn(NodeId) -> Box<dyn SimNode>;

// ── NodeContext ───────────────────────────────────────────────────────

/// Everything a node may touch while handling one packet.
///
/// The physical neighbor table is deliberately absent: nodes learn who
/// is around them from the packets they receive.
pub struct NodeContext<'a, 'b> {
    pub(crate) sim: &'a mut SimulationContext<'b>,
    pub(crate) topology: &'a Topology,
    pub(crate) factory: &'a mut PacketFactory,
    pub(crate) config: &'a SimConfig,
    pub(crate) self_id: NodeId,
    pub(crate) position: Point,
}

impl NodeContext<'_, '_> {
    #[inline]
    pub fn self_id(&self) -> NodeId {
        self.self_id
    }

    #[inline]
    pub fn now(&self) -> VirtualTime {
        self.sim.now()
    }

    /// This node's position.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Live position of another node.
    ///
    /// Only meaningful for nodes this one has heard from directly.
    pub fn position_of(&self, id: NodeId) -> SimResult<Point> {
        self.topology.position(id).ok_or(SimError::MissingTarget(id))
    }

    pub fn config(&self) -> &SimConfig {
        self.config
    }

    /// A fresh packet of a registered kind.
    pub fn new_packet(&mut self, kind: &str) -> SimResult<Packet> {
        self.factory.generate(kind)
    }

    pub fn replicate(&self, packet: &Packet) -> SimResult<Packet> {
        self.factory.replicate(packet)
    }

    /// Transmit a replica of `packet` as addressed by its header.
    ///
    /// Queues a fan-out at the current time from `header.pre` towards
    /// `header.nex`. The caller keeps `packet`.
    pub fn send_handler(&mut self, packet: &Packet) -> SimResult<EventId> {
        let replica = self.factory.replicate(packet)?;
        let (sender, receiver) = (replica.header().pre, replica.header().nex);
        let now = self.sim.now();
        self.sim
            .schedule_at(SEND_EVENT, now, Transfer::new(sender, receiver, replica))
    }
}
