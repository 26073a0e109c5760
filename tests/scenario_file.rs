//! Scenario files and JSON configs through the public API.

use std::io::Write;

use geosim::{NodeId, Scenario, SimConfig, SimError};
use tempfile::NamedTempFile;

const LINE: &str = "3 2 1
0 0 0 0 20
1 1 0 0 20
2 2 0 0 20
1 1000
40 0 2
";

fn write_temp(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn delivery_time(config: SimConfig) -> u64 {
    let file = write_temp(LINE);
    let (mut world, end) = Scenario::load(file.path(), config).unwrap().build().unwrap();
    world.start_simulate(end).unwrap();
    let deliveries = world.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, NodeId::new(2));
    deliveries[0].1.at.ticks()
}

#[test]
fn test_load_and_run() {
    assert_eq!(delivery_time(SimConfig::default()), 80);
}

#[test]
fn test_config_file_changes_hop_delay() {
    let file = write_temp(r#"{ "one_hop_delay": 5 }"#);
    let config = SimConfig::load(file.path()).unwrap();
    assert_eq!(delivery_time(config), 40 + 4 * 5);
}

#[test]
fn test_distance_links_on_unit_spacing() {
    let config = SimConfig {
        link_kind: "distance".to_string(),
        ..SimConfig::default()
    };
    assert_eq!(delivery_time(config), 80);
}

#[test]
fn test_unknown_link_kind_fails_to_build() {
    let config = SimConfig {
        link_kind: "fiber".to_string(),
        ..SimConfig::default()
    };
    let err = Scenario::parse_with(LINE, config).unwrap().build().unwrap_err();
    assert!(matches!(err, SimError::UnknownKind { .. }));
}

#[test]
fn test_missing_scenario_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::load(dir.path().join("absent.txt"), SimConfig::default()).unwrap_err();
    assert!(matches!(err, SimError::InvalidScenario(_)));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SimConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[test]
fn test_replay_from_file_is_identical() {
    let file = write_temp(LINE);
    let run = || {
        let (mut world, end) = Scenario::load(file.path(), SimConfig::default())
            .unwrap()
            .build()
            .unwrap();
        world.start_simulate(end).unwrap();
        let lines: Vec<String> = world.trace().iter().map(|e| e.to_string()).collect();
        (lines, world.trace_hash())
    };
    assert_eq!(run(), run());
}
