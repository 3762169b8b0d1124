//! World state export / import tests

use econ_core::{AgentId, Config, Economy, ManualClock, PersistenceError};
use econ_events::Industry;
use serde_json::json;
use std::fs;

fn economy(seed: u64, population: usize) -> Economy {
    let mut config = Config::default();
    config.simulation.seed = seed;
    config.simulation.initial_population = population;
    config.population.spawn_enabled = false;
    Economy::with_clock(&config, Box::new(ManualClock::new()))
}

/// Test that an exported world imports into a fresh economy unchanged
#[test]
fn test_export_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");

    let mut source = economy(9, 30);
    source.seed_population();
    source.apply_config(&serde_json::from_value(json!({ "ubi_enabled": true, "spawn_rate": 0.5 })).unwrap());
    source.set_time_speed(2.0);
    source.run(150);
    source.export_world_state(&path).unwrap();

    let mut target = economy(1, 0);
    assert!(target.import_world_state(&path));

    let expected = source.snapshot();
    let actual = target.snapshot();
    assert_eq!(actual.agents.len(), 42);
    assert_eq!(actual.agents, expected.agents);
    assert_eq!(actual.config, expected.config);
    assert_eq!(actual.day_time, expected.day_time);
    assert_eq!(actual.time_speed, 2.0);
    assert!(target.policy().ubi_enabled);
    assert_eq!(target.births().spawn_rate, 0.5);
}

/// Test that import replaces rather than merges
#[test]
fn test_import_replaces_population() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");
    economy(2, 5).export_world_state(&path).unwrap();

    let mut target = economy(3, 20);
    assert!(target.import_world_state(&path));
    assert_eq!(target.population().len(), 5);

    // Fresh ids never collide with imported ones
    let id = target.spawn_random_agent();
    assert_eq!(target.population().len(), 6);
    assert!(target.population().entity(id).is_some());
}

#[test]
fn test_newer_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    fs::write(&path, json!({ "version": 99, "agents": [{ "id": 1 }] }).to_string()).unwrap();

    let mut target = economy(4, 3);
    assert!(!target.import_world_state(&path));
    assert_eq!(target.population().len(), 3);

    let err = target.restore(econ_core::persistence::load_snapshot(&path).unwrap());
    assert!(matches!(
        err,
        Err(PersistenceError::UnsupportedVersion { found: 99, .. })
    ));
}

/// Test that a sparse hand-written document fills in defaults
#[test]
fn test_sparse_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.json");
    let doc = json!({
        "agents": [
            { "id": 7, "job": "Doctor", "industry": "Healthcare", "income": 8000.0, "mood": "calm" },
            { "id": 7, "job": "Retired", "age": 80.0 },
            { "talents": { "logical": 3.0 } }
        ],
        "config": { "max_population": 50, "weather": "sunny" },
        "day_time": 1.25,
        "time_speed": -3.0
    });
    fs::write(&path, doc.to_string()).unwrap();

    let mut target = economy(5, 0);
    assert!(target.import_world_state(&path));
    assert_eq!(target.population().len(), 3);
    assert_eq!(target.births().max_population, 50);
    assert_eq!(target.day_clock().day_time, 0.25);
    assert_eq!(target.time_speed(), econ_core::MIN_TIME_SPEED);

    let snapshot = target.snapshot();
    let doctor = &snapshot.agents[0];
    assert_eq!(doctor.id, Some(7));
    assert_eq!(doctor.industry, Industry::Healthcare.to_string());
    assert_eq!(doctor.talents["social"], 0.5);

    let retiree = &snapshot.agents[1];
    assert_ne!(retiree.id, Some(7), "duplicate id kept");
    assert!(retiree.retired);
    assert_eq!(retiree.income, retiree.pension);

    assert_eq!(snapshot.agents[2].talents["logical"], 1.0);

    // The clock keeps moving forward
    target.tick();
    assert!(target.day_clock().day_time > 0.25);
}

#[test]
fn test_broken_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let mut target = economy(6, 4);
    let before = target.snapshot();
    assert!(!target.import_world_state(&path));
    assert!(!target.import_world_state(dir.path().join("missing.json")));
    assert_eq!(target.snapshot(), before);
    assert!(target.population().entity(AgentId(7)).is_none());
}

/// Test that ids at the top of the range import and leave room for fresh ones
#[test]
fn test_largest_id_imports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("max_id.json");
    let doc = json!({ "agents": [{ "id": u64::MAX }, { "job": "Teacher" }] });
    fs::write(&path, doc.to_string()).unwrap();

    let mut target = economy(8, 2);
    assert!(target.import_world_state(&path));
    assert_eq!(target.population().len(), 2);
    assert!(target.population().entity(AgentId(u64::MAX)).is_some());

    let fresh = target.spawn_random_agent();
    assert_ne!(fresh, AgentId(u64::MAX));
    assert_eq!(target.population().len(), 3);
    let ids: std::collections::BTreeSet<Option<u64>> =
        target.snapshot().agents.iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 3, "ids collided");
}
