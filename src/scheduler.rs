/// Deterministic event scheduler.
///
/// Uses a `BinaryHeap` with reversed `Ord` on `Event` to act as a
/// min-heap keyed by `(trigger_time, priority, event_id)`. Events are
/// built through the event registry, so a new event kind only needs a
/// registered constructor.

use std::collections::BinaryHeap;

use crate::error::SimResult;
use crate::event::{Event, EventCtor, EventId, EventIdGen, EventType, Transfer, RECV_EVENT, SEND_EVENT};
use crate::registry::Registry;
use crate::time::VirtualTime;

/// Owns the event queue, the event registry and the ID generator.
pub struct Scheduler {
    /// Min-heap (via reversed Ord on Event).
    queue: BinaryHeap<Event>,
    id_gen: EventIdGen,
    kinds: Registry<EventCtor>,
}

impl Scheduler {
    /// A scheduler with `send_event` and `recv_event` registered.
    pub fn new() -> Self {
        let mut kinds: Registry<EventCtor> = Registry::new("event");
        kinds.register(SEND_EVENT, Box::new(EventType::Send));
        kinds.register(RECV_EVENT, Box::new(EventType::Recv));
        Scheduler {
            queue: BinaryHeap::new(),
            id_gen: EventIdGen::new(),
            kinds,
        }
    }

    pub fn kinds(&self) -> &Registry<EventCtor> {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut Registry<EventCtor> {
        &mut self.kinds
    }

    /// Build an event of `kind` carrying `transfer` and queue it at `at`.
    ///
    /// On `UnknownKind` nothing is queued and the transfer's packet is
    /// dropped.
    pub fn generate(&mut self, kind: &str, at: VirtualTime, transfer: Transfer) -> SimResult<EventId> {
        let payload = (self.kinds.get(kind)?)(transfer);
        Ok(self.push(at, payload))
    }

    /// Queue an already-built event payload.
    pub fn push(&mut self, at: VirtualTime, payload: EventType) -> EventId {
        let id = self.id_gen.next_id();
        self.queue.push(Event::new(id, at, payload));
        id
    }

    /// Pop the next event (earliest time, lowest priority, lowest ID).
    pub fn pop_next(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    /// Put back an event that was popped but not dispatched.
    pub(crate) fn requeue(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn peek_next(&self) -> Option<&Event> {
        self.queue.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn next_event_id(&self) -> EventId {
        self.id_gen.peek()
    }

    /// Drain all events in dispatch order.
    pub fn drain_ordered(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(e) = self.queue.pop() {
            events.push(e);
        }
        events
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.queue.len())
            .field("next_id", &self.id_gen.peek())
            .field("kinds", &self.kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::node::NodeId;
    use crate::packet::PacketFactory;

    fn transfer(f: &mut PacketFactory, to: u32) -> Transfer {
        Transfer::new(NodeId::new(0), NodeId::new(to), f.generate("gr").unwrap())
    }

    #[test]
    fn test_time_ordering() {
        let mut f = PacketFactory::default();
        let mut sched = Scheduler::new();
        sched.generate(RECV_EVENT, VirtualTime::new(30), transfer(&mut f, 1)).unwrap();
        sched.generate(RECV_EVENT, VirtualTime::new(10), transfer(&mut f, 2)).unwrap();
        sched.generate(SEND_EVENT, VirtualTime::new(20), transfer(&mut f, 3)).unwrap();

        let times: Vec<u64> = sched.drain_ordered().iter().map(|e| e.trigger_time.ticks()).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn test_same_time_order_ignores_insertion_order() {
        fn run(reverse: bool) -> Vec<u32> {
            let mut f = PacketFactory::default();
            let mut transfers: Vec<Transfer> = (1..=6).map(|to| transfer(&mut f, to)).collect();
            if reverse {
                transfers.reverse();
            }
            let mut sched = Scheduler::new();
            for t in transfers {
                sched.generate(RECV_EVENT, VirtualTime::new(5), t).unwrap();
            }
            sched
                .drain_ordered()
                .iter()
                .map(|e| e.payload.transfer().receiver.raw())
                .collect()
        }
        assert_eq!(run(false), run(true));
    }

    #[test]
    fn test_unknown_event_kind_drops_packet() {
        let mut f = PacketFactory::default();
        let mut sched = Scheduler::new();
        let t = transfer(&mut f, 1);
        assert_eq!(f.live_packets(), 1);
        let err = sched.generate("timer_event", VirtualTime::new(1), t).unwrap_err();
        assert!(matches!(err, SimError::UnknownKind { category: "event", .. }));
        assert!(sched.is_empty());
        assert_eq!(f.live_packets(), 0);
    }

    #[test]
    fn test_registered_kinds() {
        let sched = Scheduler::new();
        assert_eq!(sched.kinds().kinds(), vec!["recv_event", "send_event"]);
    }

    #[test]
    fn test_empty_scheduler() {
        let mut sched = Scheduler::new();
        assert!(sched.is_empty());
        assert_eq!(sched.len(), 0);
        assert!(sched.pop_next().is_none());
    }
}
