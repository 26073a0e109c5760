/// Simulation execution loop.
///
/// Drives the scheduler: pops events up to an end time, advances virtual
/// time, dispatches to a handler. The loop is synchronous and
/// single-threaded.

use log::{error, info, trace};

use crate::error::{SimError, SimResult};
use crate::event::{Event, EventId, Transfer};
use crate::scheduler::Scheduler;
use crate::time::VirtualTime;

// ── Handler trait ─────────────────────────────────────────────────────

/// Reacts to dispatched events.
///
/// The handler takes ownership of the event; whatever it does not move
/// elsewhere is dropped when `handle` returns.
pub trait EventHandler {
    fn handle(&mut self, ctx: &mut SimulationContext, event: Event);
}

/// A handler backed by a closure, for tests and one-off scripts.
impl<F> EventHandler for F
where
    F: FnMut(&mut SimulationContext, Event),
{
    fn handle(&mut self, ctx: &mut SimulationContext, event: Event) {
        (self)(ctx, event);
    }
}

// ── Simulation Context ───────────────────────────────────────────────

/// Mutable context passed to the handler on every dispatch.
pub struct SimulationContext<'a> {
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) now: VirtualTime,
}

impl<'a> SimulationContext<'a> {
    #[inline]
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// Queue an event of `kind` at an absolute time.
    ///
    /// Nothing stops a handler from naming a time in the past; the run
    /// loop reports that as an `OrderingViolation` when the event surfaces.
    pub fn schedule_at(&mut self, kind: &str, at: VirtualTime, transfer: Transfer) -> SimResult<EventId> {
        self.scheduler.generate(kind, at, transfer)
    }

    /// Queue an event of `kind` `delay` ticks from now.
    pub fn schedule_after(&mut self, kind: &str, delay: u64, transfer: Transfer) -> SimResult<EventId> {
        let at = self.now.saturating_plus(delay);
        self.scheduler.generate(kind, at, transfer)
    }

    pub fn pending_count(&self) -> usize {
        self.scheduler.len()
    }
}

// ── Flush report ──────────────────────────────────────────────────────

/// One event reclaimed by [`Simulation::flush_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushedEvent {
    pub trigger_time: VirtualTime,
    pub priority: u64,
    pub kind: &'static str,
}

impl std::fmt::Display for FlushedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} trigger_time = {}, priority = {:#018x}",
            self.kind,
            self.trigger_time.ticks(),
            self.priority
        )
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation driver.
///
/// Owns the scheduler and tracks the clock. Call `start_simulate` to run
/// up to an end time, or `step` to advance by exactly one event.
#[derive(Debug, Default)]
pub struct Simulation {
    scheduler: Scheduler,
    current_time: VirtualTime,
    events_processed: u64,
}

impl Simulation {
    pub fn new() -> Self {
        Simulation {
            scheduler: Scheduler::new(),
            current_time: VirtualTime::ZERO,
            events_processed: 0,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Access the scheduler directly (e.g., for initial event seeding).
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn current_time(&self) -> VirtualTime {
        self.current_time
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    /// Queue an event from outside the run loop.
    pub fn schedule(&mut self, kind: &str, at: VirtualTime, transfer: Transfer) -> SimResult<EventId> {
        self.scheduler.generate(kind, at, transfer)
    }

    /// Dispatch the next event if it fires at or before `end_time`.
    ///
    /// Returns `Ok(None)` when the queue is empty or the next event lies
    /// past `end_time`; that event stays queued. An event earlier than the
    /// clock stays queued too and is reported as `OrderingViolation`.
    pub fn step_until(&mut self, end_time: VirtualTime, handler: &mut dyn EventHandler) -> SimResult<Option<EventId>> {
        match self.scheduler.peek_next() {
            Some(next) if next.trigger_time <= end_time => {}
            _ => return Ok(None),
        }
        let Some(event) = self.scheduler.pop_next() else {
            return Ok(None);
        };

        if event.trigger_time < self.current_time {
            let err = SimError::OrderingViolation {
                requested: event.trigger_time.ticks(),
                current: self.current_time.ticks(),
            };
            error!("{}", err);
            self.scheduler.requeue(event);
            return Err(err);
        }

        self.current_time = event.trigger_time;
        self.events_processed += 1;
        let id = event.id;
        trace!("[{}] dispatch {} {}", self.current_time, id, event.payload);

        let mut ctx = SimulationContext {
            scheduler: &mut self.scheduler,
            now: self.current_time,
        };
        handler.handle(&mut ctx, event);

        Ok(Some(id))
    }

    /// Dispatch one event regardless of its time.
    pub fn step(&mut self, handler: &mut dyn EventHandler) -> SimResult<Option<EventId>> {
        self.step_until(VirtualTime::new(u64::MAX), handler)
    }

    /// Run every event with `trigger_time <= end_time`.
    ///
    /// Returns the number of events dispatched by this call. Later events
    /// remain queued for another call or for [`flush_events`].
    ///
    /// [`flush_events`]: Simulation::flush_events
    pub fn start_simulate(&mut self, end_time: VirtualTime, handler: &mut dyn EventHandler) -> SimResult<u64> {
        let start = self.events_processed;
        while self.step_until(end_time, handler)?.is_some() {}
        let processed = self.events_processed - start;
        info!(
            "simulated up to {}: {} events, {} still queued",
            end_time,
            processed,
            self.scheduler.len()
        );
        Ok(processed)
    }

    /// Run until the queue is empty.
    pub fn run(&mut self, handler: &mut dyn EventHandler) -> SimResult<u64> {
        self.start_simulate(VirtualTime::new(u64::MAX), handler)
    }

    /// Discard every queued event in dispatch order, dropping the packets
    /// they hold. Returns what was discarded.
    pub fn flush_events(&mut self) -> Vec<FlushedEvent> {
        let flushed: Vec<FlushedEvent> = self
            .scheduler
            .drain_ordered()
            .into_iter()
            .map(|e| FlushedEvent {
                trigger_time: e.trigger_time,
                priority: e.priority,
                kind: e.payload.name(),
            })
            .collect();
        for f in &flushed {
            info!("flushed {}", f);
        }
        flushed
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, RECV_EVENT, SEND_EVENT};
    use crate::node::NodeId;
    use crate::packet::PacketFactory;

    fn transfer_of(event: Event) -> Transfer {
        event.payload.into_transfer()
    }

    fn is_send(event: &Event) -> bool {
        matches!(event.payload, EventType::Send(_))
    }

    fn seed(sim: &mut Simulation, f: &mut PacketFactory, at: u64, to: u32) {
        let t = Transfer::new(NodeId::new(0), NodeId::new(to), f.generate("hi").unwrap());
        sim.schedule(RECV_EVENT, VirtualTime::new(at), t).unwrap();
    }

    #[test]
    fn test_basic_execution_loop() {
        let mut f = PacketFactory::default();
        let mut sim = Simulation::new();
        seed(&mut sim, &mut f, 30, 3);
        seed(&mut sim, &mut f, 10, 1);
        seed(&mut sim, &mut f, 20, 2);

        let mut seen: Vec<u32> = Vec::new();
        let processed = sim
            .run(&mut |_ctx: &mut SimulationContext, e: Event| {
                seen.push(transfer_of(e).receiver.raw());
            })
            .unwrap();

        assert_eq!(processed, 3);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(sim.current_time(), VirtualTime::new(30));
        assert_eq!(f.live_packets(), 0);
    }

    #[test]
    fn test_end_time_leaves_later_events_queued() {
        let mut f = PacketFactory::default();
        let mut sim = Simulation::new();
        seed(&mut sim, &mut f, 10, 1);
        seed(&mut sim, &mut f, 50, 2);
        seed(&mut sim, &mut f, 51, 3);

        let mut noop = |_ctx: &mut SimulationContext, _e: Event| {};
        assert_eq!(sim.start_simulate(VirtualTime::new(50), &mut noop).unwrap(), 2);
        assert_eq!(sim.pending(), 1);
        assert_eq!(f.live_packets(), 1);

        let flushed = sim.flush_events();
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].trigger_time, VirtualTime::new(51));
        assert_eq!(flushed[0].kind, "recv_event");
        assert!(sim.is_finished());
        assert_eq!(f.live_packets(), 0);
    }

    #[test]
    fn test_handler_schedules_followup() {
        let mut f = PacketFactory::default();
        let mut sim = Simulation::new();
        seed(&mut sim, &mut f, 0, 1);

        let mut log: Vec<(u64, bool)> = Vec::new();
        sim.run(&mut |ctx: &mut SimulationContext, e: Event| {
            log.push((ctx.now().ticks(), is_send(&e)));
            if ctx.now().ticks() < 30 {
                ctx.schedule_after(SEND_EVENT, 10, transfer_of(e)).unwrap();
            }
        })
        .unwrap();

        assert_eq!(log, vec![(0, false), (10, true), (20, true), (30, true)]);
    }

    #[test]
    fn test_past_event_is_ordering_violation() {
        let mut f = PacketFactory::default();
        let mut sim = Simulation::new();
        seed(&mut sim, &mut f, 100, 1);
        let mut noop = |_ctx: &mut SimulationContext, _e: Event| {};
        sim.run(&mut noop).unwrap();

        seed(&mut sim, &mut f, 5, 2);
        let err = sim.run(&mut noop).unwrap_err();
        assert_eq!(err, SimError::OrderingViolation { requested: 5, current: 100 });
        assert!(err.is_fatal());
        // The offending event is left for the flush.
        assert_eq!(sim.pending(), 1);
        assert_eq!(sim.current_time(), VirtualTime::new(100));
    }

    #[test]
    fn test_step_by_step() {
        let mut f = PacketFactory::default();
        let mut sim = Simulation::new();
        seed(&mut sim, &mut f, 5, 1);
        seed(&mut sim, &mut f, 15, 2);
        let mut noop = |_ctx: &mut SimulationContext, _e: Event| {};

        assert!(sim.step(&mut noop).unwrap().is_some());
        assert_eq!(sim.current_time(), VirtualTime::new(5));
        assert!(sim.step(&mut noop).unwrap().is_some());
        assert_eq!(sim.current_time(), VirtualTime::new(15));
        assert!(sim.step(&mut noop).unwrap().is_none());
    }

    #[test]
    fn test_empty_simulation() {
        let mut sim = Simulation::new();
        let mut noop = |_ctx: &mut SimulationContext, _e: Event| {};
        assert_eq!(sim.run(&mut noop).unwrap(), 0);
        assert!(sim.flush_events().is_empty());
    }
}
