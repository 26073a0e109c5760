//! Planar geometry: positions, map bounds, Euclidean distance.
//!
//! No wraparound, no curvature. Everything the routing layer compares is a
//! plain `f64` distance between two `Point`s.

/// A position on the simulation map.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The rectangle `[0, x_max) × [0, y_max)` that rendezvous points fall into.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapBounds {
    pub x_max: f64,
    pub y_max: f64,
}

impl MapBounds {
    pub fn new(x_max: f64, y_max: f64) -> Self {
        MapBounds { x_max, y_max }
    }

    /// Whether `p` lies inside the bounds. Zero-width axes accept only 0.
    pub fn contains(&self, p: Point) -> bool {
        let within = |v: f64, max: f64| v >= 0.0 && (v < max || (max == 0.0 && v == 0.0));
        within(p.x, self.x_max) && within(p.y, self.y_max)
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        MapBounds::new(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance(Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_bounds_contains() {
        let b = MapBounds::new(2.0, 1.0);
        assert!(b.contains(Point::new(1.9, 0.5)));
        assert!(!b.contains(Point::new(2.0, 0.5)));
        assert!(!b.contains(Point::new(-0.1, 0.5)));
        assert!(MapBounds::new(2.0, 0.0).contains(Point::new(1.0, 0.0)));
    }
}
