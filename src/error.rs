//! Structured error types for geosim.
//!
//! All fallible public APIs return `Result<T, SimError>`. Most variants are
//! non-fatal diagnostics: the caller logs them and the run keeps going.
//! `OrderingViolation` is the exception and halts `start_simulate`.

use crate::node::NodeId;
use crate::packet::PacketId;

/// The top-level error type for the simulation kernel and protocol layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    // ── Registry errors ───────────────────────────────────

    /// A registry was asked for a kind name nobody registered.
    #[error("no such {category} kind: {kind:?}")]
    UnknownKind {
        category: &'static str,
        kind: String,
    },

    /// A checked variant access found a different concrete variant.
    #[error("{category} is a {actual}, not a {expected}")]
    WrongVariant {
        category: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    // ── Topology errors ───────────────────────────────────

    /// A node was created with an id that is already present.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    /// A link was created for an ordered pair that already has one.
    #[error("duplicate link {from} -> {to}")]
    DuplicateLink { from: NodeId, to: NodeId },

    /// The broadcast sentinel was used where a real node id is required.
    #[error("the broadcast id cannot name a node")]
    ReservedId,

    /// An operation referenced a node that is not in the node table.
    #[error("no node {0}")]
    MissingTarget(NodeId),

    /// A physical neighbor has no link record.
    #[error("no link {from} -> {to}")]
    MissingLink { from: NodeId, to: NodeId },

    // ── Kernel errors ─────────────────────────────────────

    /// An event's trigger time precedes the kernel clock.
    #[error("cur_time = {current}, event trigger_time = {requested}")]
    OrderingViolation { requested: u64, current: u64 },

    // ── Protocol errors ───────────────────────────────────

    /// A lookup reply named a parked packet that is not in the wait list.
    #[error("no parked packet {0}")]
    NoParkedPacket(PacketId),

    // ── Scenario / config errors ──────────────────────────

    /// The textual scenario could not be parsed.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// A configuration document could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// Whether this error must stop the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::OrderingViolation { .. })
    }
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
