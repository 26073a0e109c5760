//! `GeoNode`: greedy geographic routing with a hash-rendezvous location
//! service.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::error::{SimError, SimResult};
use crate::geo::Point;
use crate::node::{NodeContext, NodeId, SimNode};
use crate::packet::{Packet, PacketId, PacketKind, ResHeader, RetHeader};
use crate::time::VirtualTime;

use super::greedy::{next_hop, RoutingDecision};
use super::rendezvous::rendezvous_point;

/// Registry name of [`GeoNode`].
pub const GEO_NODE: &str = "geo";

/// A data packet that reached its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub packet: PacketId,
    pub src: NodeId,
    pub at: VirtualTime,
    pub msg: String,
}

/// Per-node protocol counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    pub delivered: u64,
    pub forwarded: u64,
    /// Packets dropped because no neighbor was strictly closer.
    pub dead_ends: u64,
    /// Data packets parked while their destination was looked up.
    pub parked: u64,
    pub lookups_sent: u64,
    /// Lookups answered from this node's cache.
    pub lookup_hits: u64,
    /// Lookups that found nothing, here or at the rendezvous.
    pub lookup_misses: u64,
    /// Parked data packets sent on after a reply.
    pub reinjected: u64,
}

/// Protocol state of one node.
#[derive(Debug)]
pub struct GeoNode {
    id: NodeId,
    /// Nodes heard from directly via hello.
    one_hop: BTreeSet<NodeId>,
    /// Last known coordinate per peer.
    coord_cache: BTreeMap<NodeId, Point>,
    /// Data packets waiting for a lookup reply, keyed by packet id.
    pending: BTreeMap<PacketId, Packet>,
    deliveries: Vec<Delivery>,
    stats: ProtocolStats,
}

impl GeoNode {
    pub fn new(id: NodeId) -> Self {
        GeoNode {
            id,
            one_hop: BTreeSet::new(),
            coord_cache: BTreeMap::new(),
            pending: BTreeMap::new(),
            deliveries: Vec::new(),
            stats: ProtocolStats::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn one_hop(&self) -> &BTreeSet<NodeId> {
        &self.one_hop
    }

    pub fn cached(&self, id: NodeId) -> Option<Point> {
        self.coord_cache.get(&id).copied()
    }

    pub fn coord_cache(&self) -> &BTreeMap<NodeId, Point> {
        &self.coord_cache
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_parked(&self, id: PacketId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    // ── Greedy forwarding ─────────────────────────────────────────

    fn greedy(&self, ctx: &NodeContext, target: Point) -> RoutingDecision {
        let candidates = self
            .one_hop
            .iter()
            .filter_map(|&nb| ctx.position_of(nb).ok().map(|p| (nb, p)));
        next_hop(ctx.position(), candidates, target)
    }

    /// Forward `packet` one greedy step towards `target`.
    ///
    /// Returns `false` at a dead end, leaving the packet untouched.
    fn forward(&mut self, ctx: &mut NodeContext, packet: &mut Packet, target: Point) -> SimResult<bool> {
        match self.greedy(ctx, target) {
            RoutingDecision::Forward(nb) => {
                packet.header_mut().hop(self.id, nb);
                ctx.send_handler(packet)?;
                self.stats.forwarded += 1;
                Ok(true)
            }
            RoutingDecision::DeadEnd => Ok(false),
        }
    }

    // ── HI ────────────────────────────────────────────────────────

    fn on_hello(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        let src = packet.header().src;
        if src == self.id {
            packet.header_mut().hop(self.id, NodeId::BROADCAST);
            ctx.send_handler(packet)?;
        } else if self.one_hop.insert(src) {
            debug!("{} hears {}", self.id, src);
        }
        Ok(())
    }

    // ── GR ────────────────────────────────────────────────────────

    fn on_data(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        let (src, dst) = (packet.header().src, packet.header().dst);

        if dst == self.id {
            self.stats.delivered += 1;
            info!("{} delivered {} from {} at {}", self.id, packet.id(), src, ctx.now());
            self.deliveries.push(Delivery {
                packet: packet.id(),
                src,
                at: ctx.now(),
                msg: packet.payload().msg.clone(),
            });
            return Ok(());
        }

        if src == self.id {
            packet.header_mut().gr_mut()?.src_pos = ctx.position();
        }

        let target = if self.one_hop.contains(&dst) {
            let pos = ctx.position_of(dst)?;
            self.coord_cache.insert(dst, pos);
            pos
        } else if let Some(pos) = self.cached(dst) {
            pos
        } else if packet.header().gr()?.resolved {
            packet.header().gr()?.dst_pos
        } else {
            return self.park_and_lookup(ctx, packet);
        };

        let gr = packet.header_mut().gr_mut()?;
        gr.dst_pos = target;
        gr.resolved = true;

        if !self.forward(ctx, packet, target)? {
            self.stats.dead_ends += 1;
            debug!("{} dead end for {} towards {}", self.id, packet.id(), dst);
        }
        Ok(())
    }

    /// Keep a replica of `packet` and ask the rendezvous of its destination
    /// for the coordinate.
    fn park_and_lookup(&mut self, ctx: &mut NodeContext, packet: &Packet) -> SimResult<()> {
        let dst = packet.header().dst;
        let parked = ctx.replicate(packet)?;
        self.pending.insert(parked.id(), parked);
        self.stats.parked += 1;
        debug!("{} parks {} until {} is located", self.id, packet.id(), dst);

        let target = rendezvous_point(ctx.config().rendezvous_seed, dst, ctx.config().bounds);
        let Some(next) = self.greedy(ctx, target).next() else {
            self.stats.lookup_misses += 1;
            debug!("{} is the rendezvous of {} and has no coordinate", self.id, dst);
            return Ok(());
        };

        let mut ret = ctx.new_packet(PacketKind::Ret.name())?;
        ret.header_mut()
            .address(self.id, NodeId::BROADCAST, self.id, next);
        *ret.header_mut().ret_mut()? = RetHeader {
            target,
            requester: ctx.position(),
            cache_id: packet.id(),
            subject: dst,
        };
        ret.payload_mut().msg = dst.raw().to_string();
        ctx.send_handler(&ret)?;
        self.stats.lookups_sent += 1;
        Ok(())
    }

    // ── Rep ───────────────────────────────────────────────────────

    fn on_publish(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        let src = packet.header().src;
        if src == self.id {
            let rep = packet.header_mut().rep_mut()?;
            rep.src_pos = ctx.position();
            rep.target = rendezvous_point(ctx.config().rendezvous_seed, self.id, ctx.config().bounds);
        }

        let rep = packet.header().rep()?.clone();
        if !self.forward(ctx, packet, rep.target)? {
            debug!("{} stores {} at {}", self.id, src, rep.src_pos);
            self.coord_cache.insert(src, rep.src_pos);
        }
        Ok(())
    }

    // ── Ret ───────────────────────────────────────────────────────

    fn on_lookup(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        let ret = packet.header().ret()?.clone();
        if self.forward(ctx, packet, ret.target)? {
            return Ok(());
        }

        let Some(found) = self.cached(ret.subject) else {
            self.stats.lookup_misses += 1;
            debug!("{} has no coordinate for {}, lookup {} dropped", self.id, ret.subject, ret.cache_id);
            return Ok(());
        };

        let (requester, back) = (packet.header().src, packet.header().pre);
        let mut res = ctx.new_packet(PacketKind::Res.name())?;
        res.header_mut().address(self.id, requester, self.id, back);
        *res.header_mut().res_mut()? = ResHeader {
            found,
            requester: ret.requester,
            cache_id: ret.cache_id,
            subject: ret.subject,
        };
        res.payload_mut().msg = packet.payload().msg.clone();
        ctx.send_handler(&res)?;
        self.stats.lookup_hits += 1;
        Ok(())
    }

    // ── Res ───────────────────────────────────────────────────────

    fn on_reply(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        let res = packet.header().res()?.clone();

        if packet.header().dst != self.id {
            if !self.forward(ctx, packet, res.requester)? {
                self.stats.dead_ends += 1;
                debug!("{} dead end for reply {}", self.id, res.cache_id);
            }
            return Ok(());
        }

        self.coord_cache.insert(res.subject, res.found);
        let mut parked = self
            .pending
            .remove(&res.cache_id)
            .ok_or(SimError::NoParkedPacket(res.cache_id))?;
        let gr = parked.header_mut().gr_mut()?;
        gr.dst_pos = res.found;
        gr.resolved = true;
        self.stats.reinjected += 1;
        debug!("{} located {} at {}, resending {}", self.id, res.subject, res.found, res.cache_id);
        self.on_data(ctx, &mut parked)
    }
}

impl SimNode for GeoNode {
    fn recv_handler(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        match packet.kind() {
            PacketKind::Hi => self.on_hello(ctx, packet),
            PacketKind::Gr => self.on_data(ctx, packet),
            PacketKind::Rep => self.on_publish(ctx, packet),
            PacketKind::Ret => self.on_lookup(ctx, packet),
            PacketKind::Res => self.on_reply(ctx, packet),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
