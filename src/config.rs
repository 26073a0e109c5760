//! Run configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "one_hop_delay": 5, "link_kind": "distance" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::geo::MapBounds;

/// Fixed per-hop latency of the `simple` link, in ticks.
pub const ONE_HOP_DELAY: u64 = 10;

/// Default seed of the rendezvous hash.
pub const RENDEZVOUS_SEED: u64 = 0x6765_6f5f_7365_6564;

/// Tunables of one simulation world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Latency of a `simple` link.
    pub one_hop_delay: u64,
    /// Nodes at most this far apart become physical neighbors.
    pub connectivity_radius: f64,
    /// Area rendezvous points are hashed into.
    pub bounds: MapBounds,
    /// Seed of the rendezvous hash. Changing it moves every rendezvous.
    pub rendezvous_seed: u64,
    /// Link kind used by automatic adjacency.
    pub link_kind: String,
    /// Ticks per unit of distance for `distance` links.
    pub ticks_per_unit: f64,
    /// Keep a per-event trace in the runtime.
    pub record_trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            one_hop_delay: ONE_HOP_DELAY,
            connectivity_radius: 1.0,
            bounds: MapBounds::default(),
            rendezvous_seed: RENDEZVOUS_SEED,
            link_kind: crate::topology::SIMPLE_LINK.to_string(),
            ticks_per_unit: ONE_HOP_DELAY as f64,
            record_trace: true,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SimConfig::default();
        assert_eq!(c.one_hop_delay, 10);
        assert_eq!(c.connectivity_radius, 1.0);
        assert_eq!(c.link_kind, "simple");
        assert!(c.record_trace);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = SimConfig::from_json_str(r#"{ "one_hop_delay": 5, "link_kind": "distance" }"#)
            .unwrap();
        assert_eq!(c.one_hop_delay, 5);
        assert_eq!(c.link_kind, "distance");
        assert_eq!(c.rendezvous_seed, RENDEZVOUS_SEED);
    }

    #[test]
    fn test_bad_json() {
        let err = SimConfig::from_json_str("{ one_hop_delay: }").unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }
}
