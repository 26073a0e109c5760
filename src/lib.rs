//! # geosim: Deterministic Geographic Routing Simulator
//!
//! A discrete-event simulation of greedy geographic routing with a
//! hash-rendezvous location service. Single-threaded, no wall-clock time:
//! every run is a pure function of its input.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │            World              │ ← owns everything of one run
//! │  ┌────────────────────────┐  │
//! │  │      NodeRuntime        │  │ ← send/recv adapters, trace
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ GeoNode × n      │  │  │ ← HI / GR / Rep / Ret / Res
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Topology + Links │  │  │ ← physical adjacency, latency
//! │  │  └──────────────────┘  │  │
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ PacketFactory    │  │  │ ← registries, ids, live count
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! │  ┌────────────────────────┐  │
//! │  │      Simulation         │  │ ← execution loop
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ Scheduler        │  │  │ ← (time, priority, id) min-heap
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod geo;
pub mod hash;
pub mod node;
pub mod packet;
pub mod protocol;
pub mod registry;
pub mod scenario;
pub mod scheduler;
pub mod simulation;
pub mod time;
pub mod topology;
pub mod world;

// Re-exports for convenience.
pub use builder::ScenarioBuilder;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use event::{Event, EventId, EventType, Transfer, RECV_EVENT, SEND_EVENT};
pub use geo::{MapBounds, Point};
pub use node::{NodeContext, NodeId, NodeRuntime, SimNode, TraceEntry, TraceRole};
pub use packet::{Packet, PacketFactory, PacketId, PacketKind};
pub use protocol::{Delivery, GeoNode, ProtocolStats};
pub use registry::Registry;
pub use scenario::Scenario;
pub use scheduler::Scheduler;
pub use simulation::{EventHandler, FlushedEvent, Simulation, SimulationContext};
pub use time::VirtualTime;
pub use topology::{Link, Topology};
pub use world::{RunSummary, World};
