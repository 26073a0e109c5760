//! Node abstraction and the send/receive adapters.
//!
//! Nodes never touch the queue or each other directly. Every packet a
//! node transmits goes through [`NodeContext::send_handler`], becomes a
//! Send event, and is fanned out by the runtime into one Recv event per
//! matching physical neighbor.
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`id`] | [`NodeId`] newtype |
//! | [`traits`] | [`SimNode`] trait, [`NodeContext`] |
//! | [`trace`] | [`TraceEntry`] struct |
//! | [`runtime`] | [`NodeRuntime`] struct |

pub mod id;
pub mod runtime;
pub mod trace;
pub mod traits;

pub use id::NodeId;
pub use runtime::NodeRuntime;
pub use trace::{trace_hash, TraceEntry, TraceRole};
pub use traits::{NodeContext, NodeCtor, SimNode};
