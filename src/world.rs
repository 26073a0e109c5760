/// A complete simulation world: kernel, runtime and protocol nodes.
///
/// `World` is the entry point most callers need. It owns every piece of
/// mutable state of a run, so two worlds never observe each other.

use log::{debug, warn};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{EventId, Transfer, RECV_EVENT};
use crate::geo::Point;
use crate::node::{NodeCtor, NodeId, NodeRuntime, SimNode, TraceEntry};
use crate::packet::{Packet, PacketKind};
use crate::protocol::{Delivery, GeoNode, ProtocolStats, GEO_NODE};
use crate::simulation::{FlushedEvent, Simulation};
use crate::time::VirtualTime;

/// Initial event kind that makes a node broadcast a hello.
pub const HELLO: &str = "hello";
/// Initial event kind that makes a node publish its coordinate.
pub const PUBLISH: &str = "publish";
/// Message of a data packet seeded without one.
pub const DEFAULT_MSG: &str = "default";

// ── World ─────────────────────────────────────────────────────────────

pub struct World {
    sim: Simulation,
    rt: NodeRuntime,
}

impl World {
    /// An empty world with the `geo` node kind registered.
    pub fn new(config: SimConfig) -> Self {
        let mut rt = NodeRuntime::new(config);
        rt.register_node_kind(
            GEO_NODE,
            Box::new(|id: NodeId| Box::new(GeoNode::new(id)) as Box<dyn SimNode>),
        );
        World {
            sim: Simulation::new(),
            rt,
        }
    }

    pub fn config(&self) -> &SimConfig {
        self.rt.config()
    }

    pub fn register_node_kind(&mut self, kind: impl Into<String>, ctor: Box<NodeCtor>) {
        self.rt.register_node_kind(kind, ctor);
    }

    // ── Topology ──────────────────────────────────────────────

    /// Add a `geo` node.
    pub fn add_node(&mut self, id: NodeId, position: Point) -> SimResult<()> {
        self.rt.add_node(GEO_NODE, id, position)
    }

    pub fn add_node_of_kind(&mut self, kind: &str, id: NodeId, position: Point) -> SimResult<()> {
        self.rt.add_node(kind, id, position)
    }

    /// Declare `nb` a physical neighbor of `id` using the configured link
    /// kind. One direction only.
    pub fn add_phy_neighbor(&mut self, id: NodeId, nb: NodeId) -> SimResult<bool> {
        let kind = self.rt.config().link_kind.clone();
        self.rt.topology_mut().add_phy_neighbor(id, nb, &kind)
    }

    /// Connect every pair of nodes at most `radius` apart, both ways.
    pub fn connect_within(&mut self, radius: f64) -> SimResult<usize> {
        let kind = self.rt.config().link_kind.clone();
        self.rt.topology_mut().connect_within(radius, &kind)
    }

    /// `connect_within` at the configured connectivity radius.
    pub fn auto_connect(&mut self) -> SimResult<usize> {
        let radius = self.rt.config().connectivity_radius;
        self.connect_within(radius)
    }

    // ── Seeding ───────────────────────────────────────────────

    /// Seed an event at `src` for time `time`.
    ///
    /// `kind` is [`HELLO`], [`PUBLISH`], or otherwise the message of a data
    /// packet from `src` to `dst`. Hello and publish ignore `dst`.
    pub fn add_initial_event(&mut self, src: NodeId, dst: NodeId, time: u64, kind: &str) -> SimResult<EventId> {
        if src.is_broadcast() {
            warn!("initial event: {}", SimError::ReservedId);
            return Err(SimError::ReservedId);
        }
        let topology = self.rt.topology();
        if !topology.contains(src) {
            warn!("initial event: {}", SimError::MissingTarget(src));
            return Err(SimError::MissingTarget(src));
        }

        let packet_kind = match kind {
            HELLO => PacketKind::Hi,
            PUBLISH => PacketKind::Rep,
            _ => {
                if dst.is_broadcast() {
                    warn!("initial event: data packet needs a destination");
                    return Err(SimError::ReservedId);
                }
                if !topology.contains(dst) {
                    warn!("initial event: {}", SimError::MissingTarget(dst));
                    return Err(SimError::MissingTarget(dst));
                }
                PacketKind::Gr
            }
        };

        let mut packet = self.rt.factory_mut().generate(packet_kind.name())?;
        match packet_kind {
            PacketKind::Hi | PacketKind::Rep => {
                packet
                    .header_mut()
                    .address(src, NodeId::BROADCAST, src, NodeId::BROADCAST)
            }
            _ => {
                packet.header_mut().address(src, dst, src, src);
                packet.payload_mut().msg = kind.to_string();
            }
        }
        debug!("seed {} {} at T={}", packet_kind, packet, time);
        self.sim
            .schedule(RECV_EVENT, VirtualTime::new(time), Transfer::new(src, src, packet))
    }

    /// Queue a hand-built packet for delivery to `receiver` at `time`, as
    /// if `sender` had transmitted it.
    pub fn deliver_at(&mut self, sender: NodeId, receiver: NodeId, time: u64, packet: Packet) -> SimResult<EventId> {
        self.sim
            .schedule(RECV_EVENT, VirtualTime::new(time), Transfer::new(sender, receiver, packet))
    }

    /// Seed a data packet carrying [`DEFAULT_MSG`].
    pub fn send_data(&mut self, src: NodeId, dst: NodeId, time: u64) -> SimResult<EventId> {
        self.add_initial_event(src, dst, time, DEFAULT_MSG)
    }

    // ── Running ───────────────────────────────────────────────

    /// Run every event up to and including `end_time`.
    pub fn start_simulate(&mut self, end_time: u64) -> SimResult<u64> {
        self.sim.start_simulate(VirtualTime::new(end_time), &mut self.rt)
    }

    /// Drop every event still queued, with their packets.
    pub fn flush_events(&mut self) -> Vec<FlushedEvent> {
        self.sim.flush_events()
    }

    pub fn current_time(&self) -> VirtualTime {
        self.sim.current_time()
    }

    pub fn events_processed(&self) -> u64 {
        self.sim.events_processed()
    }

    pub fn pending_events(&self) -> usize {
        self.sim.pending()
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.rt.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.rt.topology().link_count()
    }

    pub fn live_packets(&self) -> i64 {
        self.rt.factory().live_packets()
    }

    pub fn node<T: SimNode + 'static>(&self, id: NodeId) -> Option<&T> {
        self.rt.node::<T>(id)
    }

    pub fn geo_node(&self, id: NodeId) -> Option<&GeoNode> {
        self.rt.node::<GeoNode>(id)
    }

    pub fn trace(&self) -> &[TraceEntry] {
        self.rt.trace()
    }

    pub fn trace_hash(&self) -> u64 {
        self.rt.trace_hash()
    }

    pub fn runtime(&self) -> &NodeRuntime {
        &self.rt
    }

    pub fn runtime_mut(&mut self) -> &mut NodeRuntime {
        &mut self.rt
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Registered kind names per entity category.
    pub fn kinds(&self) -> Vec<(&'static str, Vec<&str>)> {
        let f = self.rt.factory();
        vec![
            (f.headers().category(), f.headers().kinds()),
            (f.payloads().category(), f.payloads().kinds()),
            (f.packets().category(), f.packets().kinds()),
            (self.rt.node_kinds().category(), self.rt.node_kinds().kinds()),
            (
                self.rt.topology().link_kinds().category(),
                self.rt.topology().link_kinds().kinds(),
            ),
            (
                self.sim.scheduler().kinds().category(),
                self.sim.scheduler().kinds().kinds(),
            ),
        ]
    }

    /// Every delivery in the world, by time then receiver.
    pub fn deliveries(&self) -> Vec<(NodeId, Delivery)> {
        let mut all: Vec<(NodeId, Delivery)> = self
            .rt
            .node_ids()
            .into_iter()
            .filter_map(|id| self.geo_node(id).map(|n| (id, n)))
            .flat_map(|(id, n)| n.deliveries().iter().cloned().map(move |d| (id, d)))
            .collect();
        all.sort_by_key(|(id, d)| (d.at, *id));
        all
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            nodes: self.node_count(),
            links: self.link_count(),
            events_processed: self.events_processed(),
            pending_events: self.pending_events(),
            live_packets: self.live_packets(),
            parked: 0,
            stats: ProtocolStats::default(),
        };
        for id in self.rt.node_ids() {
            if let Some(n) = self.geo_node(id) {
                summary.parked += n.pending_count();
                let s = n.stats();
                let t = &mut summary.stats;
                t.delivered += s.delivered;
                t.forwarded += s.forwarded;
                t.dead_ends += s.dead_ends;
                t.parked += s.parked;
                t.lookups_sent += s.lookups_sent;
                t.lookup_hits += s.lookup_hits;
                t.lookup_misses += s.lookup_misses;
                t.reinjected += s.reinjected;
            }
        }
        summary
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("sim", &self.sim)
            .field("rt", &self.rt)
            .finish()
    }
}

// ── RunSummary ────────────────────────────────────────────────────────

/// Totals over a world after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub nodes: usize,
    pub links: usize,
    pub events_processed: u64,
    pub pending_events: usize,
    pub live_packets: i64,
    /// Data packets still waiting for a lookup reply.
    pub parked: usize,
    /// Protocol counters summed over all nodes.
    pub stats: ProtocolStats,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "nodes {}  links {}", self.nodes, self.links)?;
        writeln!(
            f,
            "events {}  pending {}  live packets {}  parked {}",
            self.events_processed, self.pending_events, self.live_packets, self.parked
        )?;
        let s = &self.stats;
        write!(
            f,
            "delivered {}  forwarded {}  dead ends {}  lookups {} (hits {}, misses {})  reinjected {}",
            s.delivered, s.forwarded, s.dead_ends, s.lookups_sent, s.lookup_hits, s.lookup_misses, s.reinjected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_world() -> World {
        let mut w = World::default();
        for i in 0..3 {
            w.add_node(NodeId::new(i), Point::new(i as f64, 0.0)).unwrap();
        }
        w.auto_connect().unwrap();
        w
    }

    #[test]
    fn test_seeding_validates_ids() {
        let mut w = line_world();
        assert_eq!(
            w.add_initial_event(NodeId::BROADCAST, NodeId::new(0), 0, HELLO),
            Err(SimError::ReservedId)
        );
        assert_eq!(
            w.add_initial_event(NodeId::new(9), NodeId::BROADCAST, 0, HELLO),
            Err(SimError::MissingTarget(NodeId::new(9)))
        );
        assert_eq!(
            w.send_data(NodeId::new(0), NodeId::new(9), 0),
            Err(SimError::MissingTarget(NodeId::new(9)))
        );
        assert_eq!(w.send_data(NodeId::new(0), NodeId::BROADCAST, 0), Err(SimError::ReservedId));
        assert_eq!(w.pending_events(), 0);
        assert_eq!(w.live_packets(), 0);
    }

    #[test]
    fn test_hello_seed_addresses_broadcast() {
        let mut w = line_world();
        w.add_initial_event(NodeId::new(1), NodeId::BROADCAST, 5, HELLO).unwrap();
        w.start_simulate(5).unwrap();
        let first = &w.trace()[0];
        assert_eq!(first.kind, PacketKind::Hi);
        assert_eq!((first.src, first.pre), (NodeId::new(1), NodeId::new(1)));
        assert_eq!(first.nex, NodeId::BROADCAST);
    }

    #[test]
    fn test_counts_and_kinds() {
        let w = line_world();
        assert_eq!(w.node_count(), 3);
        assert_eq!(w.link_count(), 4);
        let kinds = w.kinds();
        let names: Vec<&str> = kinds.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!["header", "payload", "packet", "node", "link", "event"]);
        assert_eq!(kinds[2].1, vec!["gr", "hi", "rep", "res", "ret"]);
        assert_eq!(kinds[3].1, vec!["geo"]);
        assert_eq!(kinds[4].1, vec!["distance", "simple"]);
    }

    #[test]
    fn test_worlds_are_isolated() {
        let mut a = line_world();
        let b = line_world();
        a.add_initial_event(NodeId::new(0), NodeId::BROADCAST, 0, HELLO).unwrap();
        assert_eq!(a.live_packets(), 1);
        assert_eq!(b.live_packets(), 0);
        assert_eq!(b.runtime().factory().next_packet_id().raw(), 0);
    }
}
