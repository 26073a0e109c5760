//! Packet payloads: a protocol-tagged message string.

use crate::error::{SimError, SimResult};

use super::kind::PacketKind;

/// Message carried by a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    kind: PacketKind,
    pub msg: String,
}

impl Payload {
    /// An empty payload for `kind`.
    pub fn new(kind: PacketKind) -> Self {
        Payload {
            kind,
            msg: String::new(),
        }
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    /// Fail with `WrongVariant` unless this payload belongs to `expected`.
    pub fn expect_kind(&self, expected: PacketKind) -> SimResult<&Self> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(SimError::WrongVariant {
                category: "payload",
                expected: expected.name(),
                actual: self.kind.name(),
            })
        }
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.msg.chars().count() > 32 {
            let head: String = self.msg.chars().take(32).collect();
            write!(f, "{}({:?}…)", self.kind, head)
        } else {
            write!(f, "{}({:?})", self.kind, self.msg)
        }
    }
}
