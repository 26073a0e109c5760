//! A user-defined node kind living next to protocol nodes.

use geosim::{NodeContext, NodeId, Packet, PacketKind, Point, SimNode, SimResult, World};

/// Records what it hears and never sends.
#[derive(Debug, Default)]
struct Sink {
    heard: Vec<(u64, PacketKind, NodeId)>,
}

impl SimNode for Sink {
    fn recv_handler(&mut self, ctx: &mut NodeContext, packet: &mut Packet) -> SimResult<()> {
        self.heard.push((ctx.now().ticks(), packet.kind(), packet.header().src));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

fn world_with_sink() -> World {
    let mut world = World::default();
    world.register_node_kind("sink", Box::new(|_: NodeId| Box::new(Sink::default()) as Box<dyn SimNode>));
    world.add_node(NodeId::new(0), Point::new(0.0, 0.0)).unwrap();
    world
        .add_node_of_kind("sink", NodeId::new(1), Point::new(1.0, 0.0))
        .unwrap();
    world.auto_connect().unwrap();
    world
}

#[test]
fn test_sink_hears_hello() {
    let mut world = world_with_sink();
    world.add_initial_event(NodeId::new(0), NodeId::BROADCAST, 0, "hello").unwrap();
    world.start_simulate(100).unwrap();

    let sink = world.node::<Sink>(NodeId::new(1)).unwrap();
    assert_eq!(sink.heard, vec![(10, PacketKind::Hi, NodeId::new(0))]);
    assert!(world.geo_node(NodeId::new(1)).is_none());
    assert_eq!(world.live_packets(), 0);
}

#[test]
fn test_registered_kinds_listed() {
    let world = world_with_sink();
    let kinds = world.kinds();
    let nodes = kinds.iter().find(|(category, _)| *category == "node").unwrap();
    assert!(nodes.1.contains(&"geo"));
    assert!(nodes.1.contains(&"sink"));
}

#[test]
fn test_unknown_node_kind() {
    let mut world = World::default();
    assert!(world
        .add_node_of_kind("relay", NodeId::new(0), Point::ORIGIN)
        .is_err());
    assert_eq!(world.node_count(), 0);
}
