//! Hash rendezvous: every node id maps to a fixed point on the map.
//!
//! A node publishes its coordinate towards its own rendezvous point and a
//! node looking for it sends the lookup towards the same point. Greedy
//! forwarding ends both at the same dead end, which is where the
//! coordinate is cached and found.

use crate::geo::{MapBounds, Point};
use crate::hash::{hash_combine, DeterministicRng};
use crate::node::NodeId;

/// The rendezvous point of `id` inside `bounds`.
///
/// Pure function of its arguments: the same seed gives the same points on
/// every run and every platform.
pub fn rendezvous_point(seed: u64, id: NodeId, bounds: MapBounds) -> Point {
    let mut rng = DeterministicRng::new(hash_combine(seed, id.raw() as u64));
    let x = rng.next_f64() * bounds.x_max;
    let y = rng.next_f64() * bounds.y_max;
    Point::new(x, y)
}
