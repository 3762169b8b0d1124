//! World Setup
//!
//! Builds the ECS world from a configuration: every economy-wide resource,
//! one company per market sector, and the starting population.

use bevy_ecs::prelude::*;
use econ_events::Industry;
use rand::Rng;
use std::io;

use crate::clock::{Clock, TimeKeeper};
use crate::components::agent::{AgentBundle, AgentId, Finances};
use crate::components::career::EducationPath;
use crate::components::company::CompanyRegistry;
use crate::components::world::{
    DayClock, DemandShocks, LifecycleRates, MarketReport, Population, SimRng,
};
use crate::config::Config;
use crate::events::EventLog;
use crate::systems::spawn_agent;

/// Create the event log described by the configuration.
///
/// Fails only when a JSONL sink is requested and cannot be opened.
pub fn create_event_log(config: &Config) -> io::Result<EventLog> {
    let capacity = config.simulation.event_log_capacity;
    match &config.simulation.event_log_path {
        Some(path) => EventLog::with_sink(capacity, path),
        None => Ok(EventLog::new(capacity)),
    }
}

/// Create a world holding every resource the tick schedule reads.
///
/// Companies are drawn from the seeded generator before any agent exists,
/// so the same seed always yields the same opening market.
pub fn create_world(config: &Config, clock: Box<dyn Clock>, log: EventLog) -> World {
    let mut rng = SimRng::from_seed(config.simulation.seed);
    let companies = CompanyRegistry::for_sectors(&Industry::MARKET_SECTORS, &mut rng.0);

    let mut world = World::new();
    world.insert_resource(config.resources.pool());
    world.insert_resource(companies);
    world.insert_resource(DemandShocks::new(&Industry::MARKET_SECTORS));
    world.insert_resource(config.policy.to_policy());
    world.insert_resource(config.macro_cycle.macro_cycle());
    world.insert_resource(DayClock::default());
    world.insert_resource(config.population.birth_control());
    world.insert_resource(TimeKeeper::new(clock, config.population.birth_timing()));
    world.insert_resource(Population::new());
    world.insert_resource(MarketReport::default());
    world.insert_resource(LifecycleRates::from(&config.lifecycle));
    world.insert_resource(log);
    world.insert_resource(rng);
    world
}

/// Spawn `count` random agents with freshly allocated ids
pub fn spawn_random_population(world: &mut World, count: usize) {
    for _ in 0..count {
        spawn_random_agent(world);
    }
}

/// Spawn one random agent with a freshly allocated id
pub fn spawn_random_agent(world: &mut World) -> AgentId {
    let id = world.resource_mut::<Population>().allocate_id();
    let bundle = {
        let mut rng = world.resource_mut::<SimRng>();
        AgentBundle::random(id, &mut rng.0)
    };
    spawn_agent(world, bundle);
    id
}

/// Spawn one working-age agent per career of every education path, each
/// committed to that path and career.
pub fn seed_career_agents(world: &mut World) -> Vec<AgentId> {
    let mut spawned = Vec::new();
    for path in EducationPath::ALL {
        for &career in path.careers() {
            let id = world.resource_mut::<Population>().allocate_id();
            let bundle = {
                let mut rng = world.resource_mut::<SimRng>();
                let mut bundle = AgentBundle::random(id, &mut rng.0);
                let demographics = &mut bundle.demographics;
                if demographics.retired {
                    demographics.retired = false;
                    demographics.age = f64::from(rng.0.gen_range(18..demographics.retirement_age));
                }
                bundle
                    .employment
                    .commit(path, career, bundle.demographics.age);
                bundle.wellbeing.has_insurance = career.insured();
                let finances = &bundle.finances;
                let mut fresh = Finances::new(finances.savings, finances.debt, finances.cost_of_living);
                fresh.record_income(bundle.employment.income);
                bundle.finances = fresh;
                bundle
            };
            spawn_agent(world, bundle);
            spawned.push(id);
        }
    }
    tracing::info!("Seeded {} career agents", spawned.len());
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::components::agent::{Demographics, Employment};
    use crate::components::career::Job;
    use crate::components::pool::ResourcePool;

    fn world(seed: u64) -> World {
        let mut config = Config::default();
        config.simulation.seed = seed;
        create_world(&config, Box::new(ManualClock::new()), EventLog::new(64))
    }

    #[test]
    fn test_world_has_market_sectors() {
        let world = world(42);
        let registry = world.resource::<CompanyRegistry>();
        let industries: Vec<Industry> = registry.iter().map(|c| c.industry).collect();
        assert_eq!(industries, Industry::MARKET_SECTORS.to_vec());
        assert_eq!(*world.resource::<ResourcePool>(), ResourcePool::default());
    }

    #[test]
    fn test_same_seed_same_companies() {
        let a = world(5);
        let b = world(5);
        let prices = |w: &World| -> Vec<f64> {
            w.resource::<CompanyRegistry>()
                .iter()
                .map(|c| c.stock_price)
                .collect()
        };
        assert_eq!(prices(&a), prices(&b));
    }

    #[test]
    fn test_seeded_careers() {
        let mut world = world(1);
        let ids = seed_career_agents(&mut world);
        assert_eq!(ids.len(), 12);
        assert_eq!(world.resource::<Population>().len(), 12);

        for (i, &id) in ids.iter().enumerate() {
            let entity = world.resource::<Population>().entity(id).unwrap();
            let path = EducationPath::ALL[i / 4];
            let career = path.careers()[i % 4];
            let employment = world.get::<Employment>(entity).unwrap();
            let demographics = world.get::<Demographics>(entity).unwrap();
            assert_eq!(employment.job, Job::Career(career));
            assert_eq!(employment.income, career.salary());
            assert_eq!(employment.path.education_path, Some(path));
            assert_eq!(employment.path.education_cost, Some(path.cost()));
            assert_eq!(
                employment.path.career_entry_age,
                Some(demographics.age + f64::from(path.years()))
            );
            assert!(!demographics.retired);
        }
    }

    #[test]
    fn test_log_sink_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.simulation.event_log_path = Some(dir.path().join("events.jsonl"));
        let log = create_event_log(&config).unwrap();
        assert!(log.has_sink());

        config.simulation.event_log_path = Some(dir.path().join("missing/dir/events.jsonl"));
        assert!(create_event_log(&config).is_err());
    }
}
