//! Packet model: header, payload, and the packet that owns them.
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`kind`] | [`PacketKind`] |
//! | [`header`] | [`Header`], per-variant bodies |
//! | [`payload`] | [`Payload`] |
//! | [`factory`] | [`PacketFactory`]: registries, id generator, live counter |
//!
//! A packet owns its header and payload outright. Fan-out never shares
//! them: [`Packet::replicate`] deep-copies both and keeps the original id.

pub mod factory;
pub mod header;
pub mod kind;
pub mod payload;

use std::cell::Cell;
use std::rc::Rc;

pub use factory::{HeaderCtor, PacketBody, PacketCtor, PacketFactory, PayloadCtor};
pub use header::{GrHeader, Header, HeaderBody, HiHeader, RepHeader, ResHeader, RetHeader};
pub use kind::PacketKind;
pub use payload::Payload;

// ── PacketId ──────────────────────────────────────────────────────────

/// Identity of an original packet, shared by all of its replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u64);

impl PacketId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        PacketId(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P#{}", self.0)
    }
}

// ── LiveCounter ───────────────────────────────────────────────────────

/// Number of packet instances currently alive in one world.
///
/// Every packet holds a handle and decrements the count when dropped.
/// Each [`PacketFactory`] owns its own counter, so independent worlds do
/// not see each other's packets.
#[derive(Debug, Clone, Default)]
pub struct LiveCounter(Rc<Cell<i64>>);

impl LiveCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i64 {
        self.0.get()
    }

    fn inc(&self) {
        self.0.set(self.0.get() + 1);
    }

    fn dec(&self) {
        self.0.set(self.0.get() - 1);
    }
}

// ── Packet ────────────────────────────────────────────────────────────

/// An addressed envelope travelling between nodes.
///
/// Not `Clone`: the only way to duplicate a packet is [`replicate`],
/// which keeps the id and bumps the live counter.
///
/// [`replicate`]: Packet::replicate
#[derive(Debug)]
pub struct Packet {
    id: PacketId,
    kind_name: Rc<str>,
    header: Header,
    payload: Payload,
    live: LiveCounter,
}

impl Packet {
    /// Assemble a packet from parts. Fails if the header and payload
    /// disagree on the variant.
    pub(crate) fn assemble(
        id: PacketId,
        kind_name: Rc<str>,
        body: PacketBody,
        live: &LiveCounter,
    ) -> crate::SimResult<Packet> {
        body.payload.expect_kind(body.header.kind())?;
        live.inc();
        Ok(Packet {
            id,
            kind_name,
            header: body.header,
            payload: body.payload,
            live: live.clone(),
        })
    }

    /// Deep copy of this packet's concrete variant. The copy keeps the
    /// original id and owns a fresh header and payload.
    pub fn replicate(&self) -> Packet {
        self.live.inc();
        Packet {
            id: self.id,
            kind_name: Rc::clone(&self.kind_name),
            header: self.header.clone(),
            payload: self.payload.clone(),
            live: self.live.clone(),
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    /// The protocol variant.
    pub fn kind(&self) -> PacketKind {
        self.header.kind()
    }

    /// The registry kind name this packet was generated from.
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }
}

impl Drop for Packet {
    fn drop(&mut self) {
        self.live.dec();
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = &self.header;
        write!(
            f,
            "{} {} src={} dst={} pre={} nex={}",
            self.id,
            self.kind(),
            h.src,
            h.dst,
            h.pre,
            h.nex
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    fn body(kind: PacketKind) -> PacketBody {
        PacketBody {
            header: Header::new(HeaderBody::empty(kind)),
            payload: Payload::new(kind),
        }
    }

    #[test]
    fn test_replica_keeps_id_and_counts() {
        let live = LiveCounter::new();
        let p = Packet::assemble(PacketId::new(7), "gr".into(), body(PacketKind::Gr), &live)
            .unwrap();
        assert_eq!(live.get(), 1);

        let r1 = p.replicate();
        let r2 = r1.replicate();
        assert_eq!(r2.id(), PacketId::new(7));
        assert_eq!(live.get(), 3);

        drop(p);
        drop(r1);
        drop(r2);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_replica_does_not_alias() {
        let live = LiveCounter::new();
        let mut p = Packet::assemble(PacketId::new(1), "gr".into(), body(PacketKind::Gr), &live)
            .unwrap();
        p.payload_mut().msg = "before".into();
        let mut r = p.replicate();

        r.payload_mut().msg = "after".into();
        r.header_mut().src = NodeId::new(9);
        r.header_mut().gr_mut().unwrap().resolved = true;

        assert_eq!(p.payload().msg, "before");
        assert_eq!(p.header().src, NodeId::BROADCAST);
        assert!(!p.header().gr().unwrap().resolved);
    }

    #[test]
    fn test_assemble_rejects_mismatched_parts() {
        let live = LiveCounter::new();
        let parts = PacketBody {
            header: Header::new(HeaderBody::empty(PacketKind::Ret)),
            payload: Payload::new(PacketKind::Res),
        };
        let err = Packet::assemble(PacketId::new(0), "ret".into(), parts, &live).unwrap_err();
        assert!(matches!(err, crate::SimError::WrongVariant { .. }));
        assert_eq!(live.get(), 0);
    }
}
