//! TraceEntry: one line per dispatched event.

use crate::hash::{hash_bytes, hash_combine};
use crate::packet::{Packet, PacketId, PacketKind};
use crate::time::VirtualTime;

use super::id::NodeId;

/// Which side of a hop the entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceRole {
    /// Fan-out at the sender.
    Send,
    /// Delivery at the receiver.
    Recv,
}

/// A record of a single dispatched event.
///
/// Appended by `NodeRuntime` on every dispatch, before the handler runs,
/// so the header fields are the ones the packet arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub time: VirtualTime,
    pub role: TraceRole,
    /// The sender for `Send`, the receiver for `Recv`.
    pub node: NodeId,
    pub packet: PacketId,
    pub kind: PacketKind,
    pub src: NodeId,
    pub dst: NodeId,
    pub pre: NodeId,
    pub nex: NodeId,
}

impl TraceEntry {
    pub fn new(time: VirtualTime, role: TraceRole, node: NodeId, packet: &Packet) -> Self {
        let h = packet.header();
        TraceEntry {
            time,
            role,
            node,
            packet: packet.id(),
            kind: packet.kind(),
            src: h.src,
            dst: h.dst,
            pre: h.pre,
            nex: h.nex,
        }
    }
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self.role {
            TraceRole::Send => "senID",
            TraceRole::Recv => "recID",
        };
        write!(
            f,
            "time {:>11}   {} {:>11}   pktID{:>11}   srcID {:>11}   dstID{:>11}   preID{:>11}   nexID{:>11}   {}",
            self.time.ticks(),
            role,
            self.node.raw(),
            self.packet.raw(),
            self.src.raw(),
            self.dst.raw(),
            self.pre.raw(),
            self.nex.raw(),
            self.kind,
        )
    }
}

/// Stable digest of a trace. Two runs of the same scenario give the same
/// value.
pub fn trace_hash(trace: &[TraceEntry]) -> u64 {
    trace
        .iter()
        .fold(0, |h, e| hash_combine(h, hash_bytes(e.to_string().as_bytes())))
}
