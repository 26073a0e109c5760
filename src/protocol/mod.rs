//! Greedy geographic routing with a hash-rendezvous location service.
//!
//! Five packet kinds cooperate:
//!
//! | Kind | Role |
//! |---|---|
//! | HI | one-hop neighbor discovery, broadcast once, never forwarded |
//! | GR | data, forwarded greedily towards the destination coordinate |
//! | Rep | publish, carries a node's coordinate to its rendezvous point |
//! | Ret | lookup, travels to the rendezvous of the wanted node |
//! | Res | lookup reply, travels back to the node holding the parked data |
//!
//! Every forwarding decision is the same greedy step: among the one-hop
//! neighbors, take the one strictly closer to the target than the current
//! holder, or stop.

pub mod greedy;
pub mod node;
pub mod rendezvous;

pub use greedy::{next_hop, RoutingDecision};
pub use node::{Delivery, GeoNode, ProtocolStats, GEO_NODE};
pub use rendezvous::rendezvous_point;
