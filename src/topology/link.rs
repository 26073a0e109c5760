//! Directed links and their latency contract.

use crate::geo::Point;
use crate::node::NodeId;

/// Registry name of [`SimpleLink`].
pub const SIMPLE_LINK: &str = "simple";
/// Registry name of [`DistanceLink`].
pub const DISTANCE_LINK: &str = "distance";

/// A directed edge between two physical neighbors.
pub trait Link {
    fn from(&self) -> NodeId;
    fn to(&self) -> NodeId;
    /// Ticks a packet spends on this link.
    fn latency(&self) -> u64;
    /// Registry name of the concrete link type.
    fn kind(&self) -> &'static str;
}

/// What a link constructor gets to see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEnds {
    pub from: NodeId,
    pub to: NodeId,
    pub from_pos: Point,
    pub to_pos: Point,
}

/// Builds a link for a pair of nodes.
pub type LinkCtor = dyn Fn(&LinkEnds) -> Box<dyn Link>;

// ── SimpleLink ────────────────────────────────────────────────────────

/// Constant-latency link.
#[derive(Debug, Clone)]
pub struct SimpleLink {
    from: NodeId,
    to: NodeId,
    delay: u64,
}

impl SimpleLink {
    pub fn new(from: NodeId, to: NodeId, delay: u64) -> Self {
        SimpleLink { from, to, delay }
    }
}

impl Link for SimpleLink {
    fn from(&self) -> NodeId {
        self.from
    }

    fn to(&self) -> NodeId {
        self.to
    }

    fn latency(&self) -> u64 {
        self.delay
    }

    fn kind(&self) -> &'static str {
        SIMPLE_LINK
    }
}

// ── DistanceLink ──────────────────────────────────────────────────────

/// Latency proportional to link length, rounded up, at least one tick.
#[derive(Debug, Clone)]
pub struct DistanceLink {
    from: NodeId,
    to: NodeId,
    latency: u64,
}

impl DistanceLink {
    pub fn new(ends: &LinkEnds, ticks_per_unit: f64) -> Self {
        let ticks = (ends.from_pos.distance(ends.to_pos) * ticks_per_unit).ceil();
        DistanceLink {
            from: ends.from,
            to: ends.to,
            latency: (ticks as u64).max(1),
        }
    }
}

impl Link for DistanceLink {
    fn from(&self) -> NodeId {
        self.from
    }

    fn to(&self) -> NodeId {
        self.to
    }

    fn latency(&self) -> u64 {
        self.latency
    }

    fn kind(&self) -> &'static str {
        DISTANCE_LINK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(a: Point, b: Point) -> LinkEnds {
        LinkEnds {
            from: NodeId::new(0),
            to: NodeId::new(1),
            from_pos: a,
            to_pos: b,
        }
    }

    #[test]
    fn test_simple_link_is_constant() {
        let l = SimpleLink::new(NodeId::new(0), NodeId::new(1), 10);
        assert_eq!(l.latency(), 10);
        assert_eq!(l.kind(), "simple");
        assert_eq!((l.from(), l.to()), (NodeId::new(0), NodeId::new(1)));
    }

    #[test]
    fn test_distance_link_rounds_up() {
        let l = DistanceLink::new(&ends(Point::new(0.0, 0.0), Point::new(0.25, 0.0)), 10.0);
        assert_eq!(l.latency(), 3);
        let l = DistanceLink::new(&ends(Point::new(0.0, 0.0), Point::new(1.0, 0.0)), 10.0);
        assert_eq!(l.latency(), 10);
    }

    #[test]
    fn test_distance_link_minimum_one_tick() {
        let l = DistanceLink::new(&ends(Point::new(0.5, 0.5), Point::new(0.5, 0.5)), 10.0);
        assert_eq!(l.latency(), 1);
    }
}
