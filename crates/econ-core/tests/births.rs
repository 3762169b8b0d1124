//! Birth pacing tests

use econ_core::config::BirthTimingMode;
use econ_core::{Config, Economy, Lineage, ManualClock};

fn empty_world(spawn_rate: f64, max_population: usize) -> (Economy, ManualClock) {
    let mut config = Config::default();
    config.simulation.initial_population = 0;
    config.population.spawn_rate = spawn_rate;
    config.population.max_population = max_population;
    let clock = ManualClock::new();
    let economy = Economy::with_clock(&config, Box::new(clock.clone()));
    (economy, clock)
}

/// One birth per second, capped at a single agent
#[test]
fn test_birth_interval_and_cap() {
    let (mut economy, clock) = empty_world(1.0, 1);

    clock.advance(0.5);
    economy.tick();
    assert_eq!(economy.population().len(), 0, "born before the interval");

    clock.advance(0.5);
    economy.tick();
    assert_eq!(economy.population().len(), 1);
    assert_eq!(economy.births().last_birth, 1.0);

    for _ in 0..50 {
        clock.advance(2.0);
        economy.tick();
    }
    assert_eq!(economy.population().len(), 1, "cap exceeded");
}

/// Paused ticks neither read the clock nor spawn
#[test]
fn test_no_births_while_paused() {
    let (mut economy, clock) = empty_world(1.0, 10);
    economy.toggle_pause();
    clock.advance(5.0);
    assert!(!economy.tick());
    assert_eq!(economy.population().len(), 0);

    economy.toggle_pause();
    assert!(economy.tick());
    assert_eq!(economy.population().len(), 1);
}

#[test]
fn test_spawn_disabled() {
    let (mut economy, clock) = empty_world(1.0, 10);
    economy.apply_config(&serde_json::from_value(serde_json::json!({ "spawn_enabled": false })).unwrap());
    clock.advance(10.0);
    economy.run(10);
    assert!(economy.population().is_empty());
}

/// Simulated timing ignores the wall clock entirely
#[test]
fn test_simulated_timing_counts_ticks() {
    let mut config = Config::default();
    config.simulation.initial_population = 0;
    config.population.spawn_rate = 1.0;
    config.population.birth_timing = BirthTimingMode::Simulated;
    config.population.seconds_per_tick = 0.25;
    let clock = ManualClock::new();
    let mut economy = Economy::with_clock(&config, Box::new(clock.clone()));

    clock.advance(1000.0);
    economy.run(3);
    assert_eq!(economy.population().len(), 0);
    economy.tick();
    assert_eq!(economy.population().len(), 1);
    economy.run(4);
    assert_eq!(economy.population().len(), 2);
}

#[test]
fn test_offspring_inherits_lineage() {
    let (mut economy, _clock) = empty_world(1.0, 10);
    let parent = economy.spawn_random_agent();
    let child = economy.spawn_offspring(parent).unwrap();
    let grandchild = economy.spawn_offspring(child).unwrap();

    let lineage = economy.agent_component::<Lineage>(grandchild).unwrap();
    assert_eq!(lineage.parent_id, Some(child));
    assert_eq!(lineage.generation, 2);
    assert!(economy.spawn_offspring(econ_core::AgentId(1)).is_none());
}
