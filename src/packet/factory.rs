//! `PacketFactory`: the header, payload and packet registries plus the
//! packet id generator and live counter of one world.

use std::rc::Rc;

use log::warn;

use crate::error::SimResult;
use crate::registry::Registry;

use super::header::{Header, HeaderBody};
use super::kind::PacketKind;
use super::payload::Payload;
use super::{LiveCounter, Packet, PacketId};

/// Builds a default header.
pub type HeaderCtor = dyn Fn() -> Header;
/// Builds a default payload.
pub type PayloadCtor = dyn Fn() -> Payload;
/// Builds the parts of a packet from the header and payload registries.
pub type PacketCtor = dyn Fn(&Registry<HeaderCtor>, &Registry<PayloadCtor>) -> SimResult<PacketBody>;

/// Header and payload of a packet under construction.
#[derive(Debug, Clone)]
pub struct PacketBody {
    pub header: Header,
    pub payload: Payload,
}

/// Owns the three packet-related registries and mints packet ids.
pub struct PacketFactory {
    headers: Registry<HeaderCtor>,
    payloads: Registry<PayloadCtor>,
    packets: Registry<PacketCtor>,
    next_id: u64,
    live: LiveCounter,
}

impl PacketFactory {
    /// A factory with empty registries.
    pub fn new() -> Self {
        PacketFactory {
            headers: Registry::new("header"),
            payloads: Registry::new("payload"),
            packets: Registry::new("packet"),
            next_id: 0,
            live: LiveCounter::new(),
        }
    }

    /// A factory with the five protocol variants registered under their
    /// [`PacketKind::name`] in all three registries.
    pub fn with_protocol_kinds() -> Self {
        let mut factory = Self::new();
        for kind in PacketKind::ALL {
            factory.register_variant(kind);
        }
        factory
    }

    /// Register header, payload and packet constructors for `kind`.
    pub fn register_variant(&mut self, kind: PacketKind) {
        let name = kind.name();
        self.headers
            .register(name, Box::new(move || Header::new(HeaderBody::empty(kind))));
        self.payloads
            .register(name, Box::new(move || Payload::new(kind)));
        self.packets.register(
            name,
            Box::new(move |headers: &Registry<HeaderCtor>, payloads: &Registry<PayloadCtor>| {
                Ok(PacketBody {
                    header: (headers.get(name)?)(),
                    payload: (payloads.get(name)?)(),
                })
            }),
        );
    }

    pub fn headers_mut(&mut self) -> &mut Registry<HeaderCtor> {
        &mut self.headers
    }

    pub fn payloads_mut(&mut self) -> &mut Registry<PayloadCtor> {
        &mut self.payloads
    }

    pub fn packets_mut(&mut self) -> &mut Registry<PacketCtor> {
        &mut self.packets
    }

    pub fn headers(&self) -> &Registry<HeaderCtor> {
        &self.headers
    }

    pub fn payloads(&self) -> &Registry<PayloadCtor> {
        &self.payloads
    }

    pub fn packets(&self) -> &Registry<PacketCtor> {
        &self.packets
    }

    /// Build a fresh packet of `kind` with a new id.
    pub fn generate(&mut self, kind: &str) -> SimResult<Packet> {
        let ctor = self.packets.get(kind)?;
        let body = ctor(&self.headers, &self.payloads)?;
        let id = PacketId::new(self.next_id);
        let packet = Packet::assemble(id, Rc::from(kind), body, &self.live)?;
        self.next_id += 1;
        Ok(packet)
    }

    /// Type-correct deep copy of `packet`, keeping its id.
    ///
    /// Fails with `UnknownKind` if the packet's kind was never registered
    /// with this factory.
    pub fn replicate(&self, packet: &Packet) -> SimResult<Packet> {
        if let Err(e) = self.packets.get(packet.kind_name()) {
            warn!("cannot replicate {}: {}", packet.id(), e);
            return Err(e);
        }
        Ok(packet.replicate())
    }

    /// Packets created by this factory that have not been dropped.
    pub fn live_packets(&self) -> i64 {
        self.live.get()
    }

    /// The id the next generated packet will get.
    pub fn next_packet_id(&self) -> PacketId {
        PacketId::new(self.next_id)
    }
}

impl Default for PacketFactory {
    fn default() -> Self {
        Self::with_protocol_kinds()
    }
}

impl std::fmt::Debug for PacketFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketFactory")
            .field("packets", &self.packets)
            .field("next_id", &self.next_id)
            .field("live", &self.live.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_generate_assigns_increasing_ids() {
        let mut f = PacketFactory::with_protocol_kinds();
        let a = f.generate("gr").unwrap();
        let b = f.generate("hi").unwrap();
        assert_eq!(a.id(), PacketId::new(0));
        assert_eq!(b.id(), PacketId::new(1));
        assert_eq!(b.kind(), PacketKind::Hi);
        assert_eq!(f.live_packets(), 2);
    }

    #[test]
    fn test_unknown_kind_does_not_consume_id() {
        let mut f = PacketFactory::with_protocol_kinds();
        let err = f.generate("flood").unwrap_err();
        assert!(matches!(err, SimError::UnknownKind { category: "packet", .. }));
        assert_eq!(f.next_packet_id(), PacketId::new(0));
        assert_eq!(f.live_packets(), 0);
    }

    #[test]
    fn test_replicate_preserves_id_through_chain() {
        let mut f = PacketFactory::with_protocol_kinds();
        let original = f.generate("rep").unwrap();
        let mut current = f.replicate(&original).unwrap();
        for _ in 0..10 {
            current = f.replicate(&current).unwrap();
        }
        assert_eq!(current.id(), original.id());
        assert_eq!(current.kind(), PacketKind::Rep);
        assert_eq!(f.live_packets(), 2);
    }

    #[test]
    fn test_replicate_unregistered_kind_fails() {
        let mut donor = PacketFactory::with_protocol_kinds();
        let p = donor.generate("res").unwrap();

        let empty = PacketFactory::new();
        assert!(empty.replicate(&p).is_err());
    }

    #[test]
    fn test_custom_kind_reuses_variant() {
        let mut f = PacketFactory::with_protocol_kinds();
        f.packets_mut().register(
            "gr_urgent",
            Box::new(|headers: &Registry<HeaderCtor>, payloads: &Registry<PayloadCtor>| {
                let mut payload = (payloads.get("gr")?)();
                payload.msg = "urgent".into();
                Ok(PacketBody {
                    header: (headers.get("gr")?)(),
                    payload,
                })
            }),
        );
        let p = f.generate("gr_urgent").unwrap();
        assert_eq!(p.kind(), PacketKind::Gr);
        assert_eq!(p.kind_name(), "gr_urgent");
        assert_eq!(p.payload().msg, "urgent");
    }
}
