//! Whitespace-delimited scenario input.
//!
//! ```text
//! node_count X_MAX Y_MAX
//! id x y hello_time publish_time        (node_count lines)
//! pair_count end_time
//! issue_time src dst                    (pair_count lines)
//! ```
//!
//! Each node line seeds a hello and a publish for that node. Each pair
//! line seeds a data packet with the default message.

use std::path::Path;
use std::str::FromStr;

use crate::builder::ScenarioBuilder;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::world::World;

/// A parsed scenario: a builder ready to produce the world, and the time
/// the run stops at.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub builder: ScenarioBuilder,
    pub end_time: u64,
}

impl Scenario {
    /// Parse scenario text under the default config.
    pub fn parse(text: &str) -> SimResult<Self> {
        Self::parse_with(text, SimConfig::default())
    }

    /// Parse scenario text on top of `config`. Map bounds always come from
    /// the input.
    pub fn parse_with(text: &str, config: SimConfig) -> SimResult<Self> {
        let mut tokens = Tokens::new(text);

        let node_count: usize = tokens.next("node count")?;
        let x_max: f64 = tokens.next("X_MAX")?;
        let y_max: f64 = tokens.next("Y_MAX")?;
        if !(x_max >= 0.0 && y_max >= 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "map bounds must be non-negative, got {} x {}",
                x_max, y_max
            )));
        }

        let mut builder = ScenarioBuilder::new().config(config).bounds(x_max, y_max);
        for _ in 0..node_count {
            let id: u32 = tokens.next("node id")?;
            let x: f64 = tokens.next("x")?;
            let y: f64 = tokens.next("y")?;
            let hello: u64 = tokens.next("hello time")?;
            let publish: u64 = tokens.next("publish time")?;
            builder = builder.node(id, x, y).hello(id, hello).publish(id, publish);
        }

        let pair_count: usize = tokens.next("pair count")?;
        let end_time: u64 = tokens.next("end time")?;
        for _ in 0..pair_count {
            let at: u64 = tokens.next("issue time")?;
            let src: u32 = tokens.next("source id")?;
            let dst: u32 = tokens.next("destination id")?;
            builder = builder.send(src, dst, at);
        }

        if let Some(extra) = tokens.rest() {
            return Err(SimError::InvalidScenario(format!(
                "unexpected trailing input {:?}",
                extra
            )));
        }

        Ok(Scenario { builder, end_time })
    }

    /// Read and parse a scenario file.
    pub fn load(path: impl AsRef<Path>, config: SimConfig) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::InvalidScenario(format!("{}: {}", path.display(), e)))?;
        Self::parse_with(&text, config)
    }

    pub fn build(self) -> SimResult<(World, u64)> {
        let world = self.builder.build()?;
        Ok((world, self.end_time))
    }
}

// ── Tokens ────────────────────────────────────────────────────────────

struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens {
            iter: text.split_whitespace(),
            position: 0,
        }
    }

    fn next<T: FromStr>(&mut self, what: &str) -> SimResult<T> {
        self.position += 1;
        let token = self.iter.next().ok_or_else(|| {
            SimError::InvalidScenario(format!("expected {} at token {}, found end of input", what, self.position))
        })?;
        token.parse().map_err(|_| {
            SimError::InvalidScenario(format!("expected {} at token {}, found {:?}", what, self.position, token))
        })
    }

    fn rest(&mut self) -> Option<&'a str> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::MapBounds;
    use crate::node::NodeId;

    const LINE: &str = "3 2 1
0 0 0 0 20
1 1 0 0 20
2 2 0 0 20
1 1000
40 0 2
";

    #[test]
    fn test_parse_line() {
        let s = Scenario::parse(LINE).unwrap();
        assert_eq!(s.end_time, 1000);
        assert_eq!(s.builder.node_count(), 3);
        assert_eq!(s.builder.event_count(), 7);
    }

    #[test]
    fn test_bounds_from_input() {
        let (w, _) = Scenario::parse(LINE).unwrap().build().unwrap();
        assert_eq!(w.config().bounds, MapBounds::new(2.0, 1.0));
        assert_eq!(w.link_count(), 4);
    }

    #[test]
    fn test_run_delivers() {
        let (mut w, end) = Scenario::parse(LINE).unwrap().build().unwrap();
        w.start_simulate(end).unwrap();
        let d = w.deliveries();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].0, NodeId::new(2));
        assert_eq!(d[0].1.at.ticks(), 80);
    }

    #[test]
    fn test_config_kept_but_bounds_replaced() {
        let config = SimConfig {
            one_hop_delay: 7,
            bounds: MapBounds::new(50.0, 50.0),
            ..SimConfig::default()
        };
        let (w, _) = Scenario::parse_with(LINE, config).unwrap().build().unwrap();
        assert_eq!(w.config().one_hop_delay, 7);
        assert_eq!(w.config().bounds, MapBounds::new(2.0, 1.0));
    }

    #[test]
    fn test_truncated_input() {
        let err = Scenario::parse("2 1 1\n0 0 0 0 0\n").unwrap_err();
        match err {
            SimError::InvalidScenario(msg) => assert!(msg.contains("node id"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_number() {
        let err = Scenario::parse("1 1 1\n0 zero 0 0 0\n0 10\n").unwrap_err();
        match err {
            SimError::InvalidScenario(msg) => assert!(msg.contains("\"zero\""), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_trailing_input() {
        let err = Scenario::parse("1 1 1\n0 0 0 0 0\n0 10\n5").unwrap_err();
        assert!(matches!(err, SimError::InvalidScenario(_)));
    }

    #[test]
    fn test_negative_bounds() {
        assert!(Scenario::parse("0 -1 1\n0 10\n").is_err());
    }

    #[test]
    fn test_empty_scenario() {
        let (w, end) = Scenario::parse("0 0 0\n0 0\n").unwrap().build().unwrap();
        assert_eq!(w.node_count(), 0);
        assert_eq!(end, 0);
    }
}
