/// Event system for the deterministic simulation kernel.
///
/// Every packet movement in geosim is modeled as an `Event`. An event owns
/// the packet it carries, sits on the scheduler's priority queue, and is
/// consumed exactly once: either dispatched or flushed.

use std::cmp::Ordering;

use crate::hash::hash_combine;
use crate::node::NodeId;
use crate::packet::Packet;
use crate::time::VirtualTime;

/// Registry name of the fan-out event.
pub const SEND_EVENT: &str = "send_event";
/// Registry name of the delivery event.
pub const RECV_EVENT: &str = "recv_event";

// ── Event ID ──────────────────────────────────────────────────────────

/// A per-world, strictly increasing event identifier.
///
/// Used as the last tie-break after trigger time and priority, so two
/// events can never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        EventId(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

// ── Event ID Generator ───────────────────────────────────────────────

/// Deterministic, strictly-increasing event-ID generator.
#[derive(Debug, Clone, Default)]
pub struct EventIdGen {
    next: u64,
}

impl EventIdGen {
    pub fn new() -> Self {
        EventIdGen { next: 0 }
    }

    /// Mint the next event ID.
    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next);
        self.next += 1;
        id
    }

    /// Peek at the next ID without consuming it.
    pub fn peek(&self) -> EventId {
        EventId(self.next)
    }
}

// ── Transfer ──────────────────────────────────────────────────────────

/// A packet in flight between two nodes.
#[derive(Debug)]
pub struct Transfer {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub packet: Packet,
}

impl Transfer {
    pub fn new(sender: NodeId, receiver: NodeId, packet: Packet) -> Self {
        Transfer {
            sender,
            receiver,
            packet,
        }
    }
}

// ── Event Type ────────────────────────────────────────────────────────

/// What happens when the event fires.
#[derive(Debug)]
pub enum EventType {
    /// The sender fans the packet out to its matching physical neighbors.
    Send(Transfer),
    /// The receiver runs its receive handler on the packet.
    Recv(Transfer),
}

impl EventType {
    pub fn transfer(&self) -> &Transfer {
        match self {
            EventType::Send(t) | EventType::Recv(t) => t,
        }
    }

    pub fn into_transfer(self) -> Transfer {
        match self {
            EventType::Send(t) | EventType::Recv(t) => t,
        }
    }

    /// Registry name of this event's kind.
    pub fn name(&self) -> &'static str {
        match self {
            EventType::Send(_) => SEND_EVENT,
            EventType::Recv(_) => RECV_EVENT,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Send(t) => write!(f, "Send({} → {}, {})", t.sender, t.receiver, t.packet.id()),
            EventType::Recv(t) => write!(f, "Recv({} → {}, {})", t.sender, t.receiver, t.packet.id()),
        }
    }
}

/// Wraps a transfer into a concrete event kind.
pub type EventCtor = dyn Fn(Transfer) -> EventType;

// ── Event ─────────────────────────────────────────────────────────────

/// A single simulation event.
///
/// The scheduler orders events by `(trigger_time, priority, id)`. The
/// priority is a fixed hash of the event's contents, so same-time events
/// fire in an order that does not depend on insertion order.
#[derive(Debug)]
pub struct Event {
    pub id: EventId,
    pub trigger_time: VirtualTime,
    pub priority: u64,
    pub payload: EventType,
}

impl Event {
    pub fn new(id: EventId, trigger_time: VirtualTime, payload: EventType) -> Self {
        let priority = event_priority(trigger_time, payload.transfer());
        Event {
            id,
            trigger_time,
            priority,
            payload,
        }
    }

    fn key(&self) -> (VirtualTime, u64, EventId) {
        (self.trigger_time, self.priority, self.id)
    }
}

/// Same-time tie-break hash over `(time, sender, receiver, packet id)`.
pub fn event_priority(at: VirtualTime, transfer: &Transfer) -> u64 {
    let mut h = hash_combine(0, at.ticks());
    h = hash_combine(h, transfer.sender.raw() as u64);
    h = hash_combine(h, transfer.receiver.raw() as u64);
    hash_combine(h, transfer.packet.id().raw())
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Event {}

/// Ordering: smallest `(trigger_time, priority, id)` first.
///
/// `BinaryHeap` is a max-heap, so the natural ordering is reversed here.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
