//! Greedy next-hop selection.

use crate::geo::Point;
use crate::node::NodeId;

/// Outcome of one greedy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Hand the packet to this strictly closer neighbor.
    Forward(NodeId),
    /// No neighbor is strictly closer than the current holder.
    DeadEnd,
}

impl RoutingDecision {
    pub fn next(self) -> Option<NodeId> {
        match self {
            RoutingDecision::Forward(nb) => Some(nb),
            RoutingDecision::DeadEnd => None,
        }
    }
}

/// Pick the candidate strictly closest to `target`.
///
/// The current holder at `own` starts as the best choice and a candidate
/// replaces the running best only if it is strictly closer, so ties keep
/// whichever came first: the holder itself, then candidates in iteration
/// order.
pub fn next_hop<I>(own: Point, candidates: I, target: Point) -> RoutingDecision
where
    I: IntoIterator<Item = (NodeId, Point)>,
{
    let mut best = None;
    let mut min = own.distance(target);
    for (id, pos) in candidates {
        let d = pos.distance(target);
        if d < min {
            min = d;
            best = Some(id);
        }
    }
    best.map_or(RoutingDecision::DeadEnd, RoutingDecision::Forward)
}
