//! Packet headers: shared addressing plus one body per protocol variant.

use crate::error::{SimError, SimResult};
use crate::geo::Point;
use crate::node::NodeId;

use super::kind::PacketKind;
use super::PacketId;

// ── Variant bodies ────────────────────────────────────────────────────

/// Data packet fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GrHeader {
    /// Originator position, stamped on first touch.
    pub src_pos: Point,
    /// Destination position once known.
    pub dst_pos: Point,
    /// Set when `dst_pos` holds a real coordinate rather than the default.
    pub resolved: bool,
}

/// Hello packets carry nothing beyond the addressing fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HiHeader;

/// Publish packet fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepHeader {
    /// Advertiser position.
    pub src_pos: Point,
    /// Rendezvous point of the advertiser's id.
    pub target: Point,
}

/// Lookup request fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RetHeader {
    /// Rendezvous point of `subject`.
    pub target: Point,
    /// Position of the node waiting for the answer.
    pub requester: Point,
    /// Id of the parked data packet this lookup serves.
    pub cache_id: PacketId,
    /// The node whose position is being looked up.
    pub subject: NodeId,
}

impl Default for RetHeader {
    fn default() -> Self {
        RetHeader {
            target: Point::ORIGIN,
            requester: Point::ORIGIN,
            cache_id: PacketId::new(0),
            subject: NodeId::BROADCAST,
        }
    }
}

/// Lookup reply fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ResHeader {
    /// The coordinate found at the rendezvous.
    pub found: Point,
    /// Position of the node waiting for the answer.
    pub requester: Point,
    pub cache_id: PacketId,
    pub subject: NodeId,
}

impl Default for ResHeader {
    fn default() -> Self {
        ResHeader {
            found: Point::ORIGIN,
            requester: Point::ORIGIN,
            cache_id: PacketId::new(0),
            subject: NodeId::BROADCAST,
        }
    }
}

/// The protocol-specific part of a header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderBody {
    Gr(GrHeader),
    Hi(HiHeader),
    Rep(RepHeader),
    Ret(RetHeader),
    Res(ResHeader),
}

impl HeaderBody {
    /// A default body for `kind`.
    pub fn empty(kind: PacketKind) -> Self {
        match kind {
            PacketKind::Gr => HeaderBody::Gr(GrHeader::default()),
            PacketKind::Hi => HeaderBody::Hi(HiHeader),
            PacketKind::Rep => HeaderBody::Rep(RepHeader::default()),
            PacketKind::Ret => HeaderBody::Ret(RetHeader::default()),
            PacketKind::Res => HeaderBody::Res(ResHeader::default()),
        }
    }

    /// Which variant this body is.
    pub fn kind(&self) -> PacketKind {
        match self {
            HeaderBody::Gr(_) => PacketKind::Gr,
            HeaderBody::Hi(_) => PacketKind::Hi,
            HeaderBody::Rep(_) => PacketKind::Rep,
            HeaderBody::Ret(_) => PacketKind::Ret,
            HeaderBody::Res(_) => PacketKind::Res,
        }
    }
}

// ── Header ────────────────────────────────────────────────────────────

/// Addressing fields plus a variant body.
///
/// All four ids start out as [`NodeId::BROADCAST`].
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub src: NodeId,
    pub dst: NodeId,
    /// The node that last transmitted this packet.
    pub pre: NodeId,
    /// The intended next receiver, or `BROADCAST` for every neighbor.
    pub nex: NodeId,
    body: HeaderBody,
}

macro_rules! body_access {
    ($get:ident, $get_mut:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Checked access to the `", stringify!($variant), "` body.")]
        pub fn $get(&self) -> SimResult<&$ty> {
            match &self.body {
                HeaderBody::$variant(h) => Ok(h),
                other => Err(wrong_variant(PacketKind::$variant, other.kind())),
            }
        }

        #[doc = concat!("Checked mutable access to the `", stringify!($variant), "` body.")]
        pub fn $get_mut(&mut self) -> SimResult<&mut $ty> {
            match &mut self.body {
                HeaderBody::$variant(h) => Ok(h),
                other => Err(wrong_variant(PacketKind::$variant, other.kind())),
            }
        }
    };
}

fn wrong_variant(expected: PacketKind, actual: PacketKind) -> SimError {
    SimError::WrongVariant {
        category: "header",
        expected: expected.name(),
        actual: actual.name(),
    }
}

impl Header {
    /// A header with every id set to `BROADCAST`.
    pub fn new(body: HeaderBody) -> Self {
        Header {
            src: NodeId::BROADCAST,
            dst: NodeId::BROADCAST,
            pre: NodeId::BROADCAST,
            nex: NodeId::BROADCAST,
            body,
        }
    }

    /// Set all four addressing ids at once.
    pub fn address(&mut self, src: NodeId, dst: NodeId, pre: NodeId, nex: NodeId) {
        self.src = src;
        self.dst = dst;
        self.pre = pre;
        self.nex = nex;
    }

    /// Mark this node as the transmitter and `next` as the receiver.
    pub fn hop(&mut self, current: NodeId, next: NodeId) {
        self.pre = current;
        self.nex = next;
    }

    pub fn kind(&self) -> PacketKind {
        self.body.kind()
    }

    pub fn body(&self) -> &HeaderBody {
        &self.body
    }

    body_access!(gr, gr_mut, Gr, GrHeader);
    body_access!(hi, hi_mut, Hi, HiHeader);
    body_access!(rep, rep_mut, Rep, RepHeader);
    body_access!(ret, ret_mut, Ret, RetHeader);
    body_access!(res, res_mut, Res, ResHeader);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header_is_broadcast() {
        let h = Header::new(HeaderBody::empty(PacketKind::Gr));
        assert_eq!(h.src, NodeId::BROADCAST);
        assert_eq!(h.dst, NodeId::BROADCAST);
        assert_eq!(h.pre, NodeId::BROADCAST);
        assert_eq!(h.nex, NodeId::BROADCAST);
        assert_eq!(h.kind(), PacketKind::Gr);
    }

    #[test]
    fn test_checked_access() {
        let mut h = Header::new(HeaderBody::empty(PacketKind::Rep));
        h.rep_mut().unwrap().target = Point::new(1.0, 2.0);
        assert_eq!(h.rep().unwrap().target, Point::new(1.0, 2.0));

        let err = h.gr().unwrap_err();
        assert_eq!(
            err,
            SimError::WrongVariant {
                category: "header",
                expected: "gr",
                actual: "rep",
            }
        );
    }

    #[test]
    fn test_hop_updates_pre_and_nex() {
        let mut h = Header::new(HeaderBody::empty(PacketKind::Hi));
        h.address(NodeId::new(1), NodeId::new(2), NodeId::new(1), NodeId::new(1));
        h.hop(NodeId::new(5), NodeId::new(6));
        assert_eq!(h.src, NodeId::new(1));
        assert_eq!(h.pre, NodeId::new(5));
        assert_eq!(h.nex, NodeId::new(6));
    }
}
