/// Fluent builder for simulation worlds.
///
/// Collects nodes and initial events, then builds a `World` with radius
/// adjacency already wired. Events are seeded in the order they were
/// added, which fixes packet ids.

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::geo::{MapBounds, Point};
use crate::node::NodeId;
use crate::world::{World, DEFAULT_MSG, HELLO, PUBLISH};

// ── ScenarioBuilder ───────────────────────────────────────────────────

/// Fluent builder for a ready-to-run [`World`].
///
/// # Example
/// ```rust
/// use geosim::builder::ScenarioBuilder;
///
/// let mut world = ScenarioBuilder::new()
///     .bounds(2.0, 1.0)
///     .node(0, 0.0, 0.0)
///     .node(1, 1.0, 0.0)
///     .node(2, 2.0, 0.0)
///     .hello_all(0)
///     .publish_all(20)
///     .send(0, 2, 40)
///     .build()
///     .unwrap();
/// world.start_simulate(1000).unwrap();
/// assert_eq!(world.deliveries().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    config: SimConfig,
    nodes: Vec<(NodeId, Point)>,
    events: Vec<Seed>,
}

#[derive(Debug, Clone)]
struct Seed {
    src: NodeId,
    dst: NodeId,
    time: u64,
    kind: String,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Configuration ─────────────────────────────────────────

    /// Replace the whole config. Later calls to `bounds`, `radius` and
    /// `link_kind` still apply on top of it.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bounds(mut self, x_max: f64, y_max: f64) -> Self {
        self.config.bounds = MapBounds::new(x_max, y_max);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.config.connectivity_radius = radius;
        self
    }

    pub fn link_kind(mut self, kind: &str) -> Self {
        self.config.link_kind = kind.to_string();
        self
    }

    pub fn record_trace(mut self, on: bool) -> Self {
        self.config.record_trace = on;
        self
    }

    // ── Nodes ─────────────────────────────────────────────────

    pub fn node(mut self, id: u32, x: f64, y: f64) -> Self {
        self.nodes.push((NodeId::new(id), Point::new(x, y)));
        self
    }

    // ── Events ────────────────────────────────────────────────

    pub fn hello(self, id: u32, at: u64) -> Self {
        self.event(id, NodeId::BROADCAST.raw(), at, HELLO)
    }

    pub fn publish(self, id: u32, at: u64) -> Self {
        self.event(id, NodeId::BROADCAST.raw(), at, PUBLISH)
    }

    /// Hello from every node added so far.
    pub fn hello_all(mut self, at: u64) -> Self {
        for i in 0..self.nodes.len() {
            let id = self.nodes[i].0.raw();
            self = self.hello(id, at);
        }
        self
    }

    /// Publish from every node added so far.
    pub fn publish_all(mut self, at: u64) -> Self {
        for i in 0..self.nodes.len() {
            let id = self.nodes[i].0.raw();
            self = self.publish(id, at);
        }
        self
    }

    /// Data packet carrying the default message.
    pub fn send(self, src: u32, dst: u32, at: u64) -> Self {
        self.event(src, dst, at, DEFAULT_MSG)
    }

    /// Data packet carrying `msg`.
    pub fn send_msg(self, src: u32, dst: u32, at: u64, msg: &str) -> Self {
        self.event(src, dst, at, msg)
    }

    fn event(mut self, src: u32, dst: u32, time: u64, kind: &str) -> Self {
        self.events.push(Seed {
            src: NodeId::new(src),
            dst: NodeId::new(dst),
            time,
            kind: kind.to_string(),
        });
        self
    }

    // ── Build ─────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Create the world, connect nodes within the radius and seed every
    /// event. Fails on the first rejected node or event.
    pub fn build(self) -> SimResult<World> {
        let mut world = World::new(self.config);
        for (id, position) in self.nodes {
            world.add_node(id, position)?;
        }
        world.auto_connect()?;
        for seed in self.events {
            world.add_initial_event(seed.src, seed.dst, seed.time, &seed.kind)?;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_build_wires_radius() {
        let w = ScenarioBuilder::new()
            .node(0, 0.0, 0.0)
            .node(1, 1.0, 0.0)
            .node(2, 3.0, 0.0)
            .build()
            .unwrap();
        assert_eq!(w.node_count(), 3);
        assert_eq!(w.link_count(), 2);
    }

    #[test]
    fn test_radius_override() {
        let w = ScenarioBuilder::new()
            .radius(2.5)
            .node(0, 0.0, 0.0)
            .node(1, 1.0, 0.0)
            .node(2, 3.0, 0.0)
            .build()
            .unwrap();
        assert_eq!(w.link_count(), 4);
    }

    #[test]
    fn test_events_seeded_in_order() {
        let w = ScenarioBuilder::new()
            .node(0, 0.0, 0.0)
            .node(1, 1.0, 0.0)
            .hello_all(0)
            .publish(1, 5)
            .send(0, 1, 9)
            .build()
            .unwrap();
        assert_eq!(w.pending_events(), 4);
        assert_eq!(w.live_packets(), 4);
    }

    #[test]
    fn test_duplicate_node_fails() {
        let err = ScenarioBuilder::new()
            .node(0, 0.0, 0.0)
            .node(0, 1.0, 0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicateNode(_)));
    }

    #[test]
    fn test_event_for_unknown_node_fails() {
        let err = ScenarioBuilder::new()
            .node(0, 0.0, 0.0)
            .send(7, 0, 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::MissingTarget(_)));
    }

    #[test]
    fn test_config_then_overrides() {
        let b = ScenarioBuilder::new()
            .config(SimConfig {
                one_hop_delay: 3,
                ..SimConfig::default()
            })
            .bounds(4.0, 2.0)
            .link_kind("distance");
        assert_eq!(b.config.one_hop_delay, 3);
        assert_eq!(b.config.bounds, MapBounds::new(4.0, 2.0));
        assert_eq!(b.config.link_kind, "distance");
    }
}
