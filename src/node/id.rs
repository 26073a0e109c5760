//! Node ID: a small ordered node identifier.

/// A unique identifier for a simulated node.
///
/// `u32::MAX` is reserved as [`NodeId::BROADCAST`]: in a header's next-hop
/// field it means "every physical neighbor", and it can never name a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The broadcast sentinel.
    pub const BROADCAST: NodeId = NodeId(u32::MAX);

    /// Create a node ID from a raw integer.
    #[inline]
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Return the underlying integer.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_broadcast() {
            write!(f, "N*")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}
