//! Economy Orchestrator
//!
//! Owns the ECS world and the tick schedule, and exposes the commands and
//! queries external collaborators use to drive and observe a run.

use bevy_ecs::prelude::*;
use econ_events::{EconEvent, Industry, WorldSnapshot};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::clock::{Clock, SystemClock};
use crate::components::agent::{
    AgentBundle, AgentId, Demographics, Employment, Finances, Lineage, Movement, Traits, Wellbeing,
};
use crate::components::career::Job;
use crate::components::company::CompanyRegistry;
use crate::components::pool::ResourcePool;
use crate::components::world::{
    BirthControl, DayClock, DemandShocks, MacroCycle, MarketReport, Policy, Population, SimRng,
};
use crate::config::{Config, ConfigPatch, ScenarioPreset};
use crate::events::EventLog;
use crate::persistence::{self, PersistenceError};
use crate::projection::{AgentView, SocioeconomicClass};
use crate::setup;
use crate::systems::{build_tick_schedule, spawn_agent};

/// Income range offered by a company when it hires
pub const HIRE_INCOME: std::ops::RangeInclusive<u32> = 3000..=12000;

/// Market figures for one company
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompanyStats {
    pub stock_price: f64,
    /// Current growth expressed as a percentage
    pub percent_change: f64,
}

/// The simulation: world state plus the schedule that advances it
pub struct Economy {
    world: World,
    schedule: Schedule,
}

impl Economy {
    /// Build an economy timed by the wall clock
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// Build an economy whose births are timed by `clock`.
    ///
    /// The starting population is spawned immediately. If the configured
    /// event sink cannot be opened the log stays in memory.
    pub fn with_clock(config: &Config, clock: Box<dyn Clock>) -> Self {
        let log = setup::create_event_log(config).unwrap_or_else(|e| {
            tracing::warn!("Could not open event sink: {}. Logging in memory only.", e);
            EventLog::new(config.simulation.event_log_capacity)
        });
        let mut world = setup::create_world(config, clock, log);
        setup::spawn_random_population(&mut world, config.simulation.initial_population);
        if config.simulation.seed_careers {
            setup::seed_career_agents(&mut world);
        }
        tracing::info!(
            "Economy created: {} agents, {} companies, seed {}",
            world.resource::<Population>().len(),
            world.resource::<CompanyRegistry>().len(),
            config.simulation.seed
        );

        Self {
            world,
            schedule: build_tick_schedule(),
        }
    }

    /// Run one tick. Returns false without doing anything while paused.
    pub fn tick(&mut self) -> bool {
        if self.world.resource::<DayClock>().paused {
            return false;
        }
        self.schedule.run(&mut self.world);
        true
    }

    /// Run up to `ticks` ticks; returns how many actually ran
    pub fn run(&mut self, ticks: u64) -> u64 {
        (0..ticks).filter(|_| self.tick()).count() as u64
    }

    // === Commands ===

    /// Merge a partial settings change. Unknown keys are reported, not
    /// applied.
    pub fn apply_config(&mut self, patch: &ConfigPatch) {
        if !patch.unknown.is_empty() {
            let keys: Vec<&str> = patch.unknown.keys().map(String::as_str).collect();
            tracing::warn!("Ignoring unknown config keys {:?}", keys);
        }
        patch.apply_to_policy(&mut self.world.resource_mut::<Policy>());
        patch.apply_to_births(&mut self.world.resource_mut::<BirthControl>());
    }

    pub fn apply_scenario(&mut self, preset: ScenarioPreset) {
        tracing::info!("Applying scenario: {}", preset);
        self.apply_config(&preset.patch());
    }

    /// Add an agent to the population. A colliding id is replaced with a
    /// fresh one; the id actually used is returned.
    pub fn add_agent(&mut self, mut agent: AgentBundle) -> AgentId {
        {
            let mut population = self.world.resource_mut::<Population>();
            if population.contains(agent.id) {
                let fresh = population.allocate_id();
                tracing::warn!("Agent id {} already in use, assigned {}", agent.id, fresh);
                agent.id = fresh;
            }
        }
        let id = agent.id;
        spawn_agent(&mut self.world, agent);
        id
    }

    /// Reserve an id for an agent built outside the economy
    pub fn next_agent_id(&mut self) -> AgentId {
        self.world.resource_mut::<Population>().allocate_id()
    }

    pub fn spawn_random_agent(&mut self) -> AgentId {
        setup::spawn_random_agent(&mut self.world)
    }

    /// Spawn a child of `parent`; `None` if the parent is unknown
    pub fn spawn_offspring(&mut self, parent: AgentId) -> Option<AgentId> {
        let entity = self.world.resource::<Population>().entity(parent)?;
        let traits = self.world.get::<Traits>(entity)?.clone();
        let lineage = *self.world.get::<Lineage>(entity)?;

        let id = self.next_agent_id();
        let child = {
            let mut rng = self.world.resource_mut::<SimRng>();
            AgentBundle::offspring(id, (parent, &traits, &lineage), &mut rng.0)
        };
        spawn_agent(&mut self.world, child);
        Some(id)
    }

    /// Add one agent per career of every education path
    pub fn seed_population(&mut self) -> Vec<AgentId> {
        setup::seed_career_agents(&mut self.world)
    }

    /// Flip the pause flag; returns the new state
    pub fn toggle_pause(&mut self) -> bool {
        let mut clock = self.world.resource_mut::<DayClock>();
        clock.paused = !clock.paused;
        tracing::info!("Simulation {}", if clock.paused { "paused" } else { "resumed" });
        clock.paused
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<DayClock>().paused
    }

    /// Set the time multiplier (floored at `MIN_TIME_SPEED`)
    pub fn set_time_speed(&mut self, speed: f64) {
        self.world.resource_mut::<DayClock>().set_time_speed(speed);
    }

    pub fn time_speed(&self) -> f64 {
        self.world.resource::<DayClock>().time_speed
    }

    /// Put an agent on a company's payroll.
    ///
    /// The agent takes the company's name as job label and industry and a
    /// random income, leaving any previous employer's payroll. Retirees,
    /// unknown agents or companies, and agents already on this payroll are
    /// refused.
    pub fn hire(&mut self, industry: Industry, agent: AgentId) -> bool {
        let Some(entity) = self.world.resource::<Population>().entity(agent) else {
            return false;
        };
        if self.world.get::<Demographics>(entity).map_or(true, |d| d.retired) {
            tracing::warn!("Agent {} cannot be hired", agent);
            return false;
        }
        let company = {
            let mut registry = self.world.resource_mut::<CompanyRegistry>();
            match registry.get(industry) {
                Some(company) if company.employs(agent) => return false,
                Some(_) => {}
                None => return false,
            }
            // An agent works for one company at a time
            for other in registry.iter_mut() {
                other.release(agent);
            }
            let Some(company) = registry.get_mut(industry) else {
                return false;
            };
            company.hire(agent);
            company.name.clone()
        };

        let income = f64::from(self.world.resource_mut::<SimRng>().0.gen_range(HIRE_INCOME));
        if let Some(mut employment) = self.world.get_mut::<Employment>(entity) {
            employment.job = Job::Other(company.clone());
            employment.income = income;
            employment.industry = Some(industry);
        }
        self.world.resource_mut::<EventLog>().log(EconEvent::Hired {
            agent_id: agent.0,
            company,
        });
        true
    }

    /// Let go the most recently hired `fraction` of a company's workforce.
    ///
    /// Returns how many agents were laid off.
    pub fn layoff(&mut self, industry: Industry, fraction: f64) -> usize {
        let (company, removed) = {
            let mut registry = self.world.resource_mut::<CompanyRegistry>();
            let Some(company) = registry.get_mut(industry) else {
                return 0;
            };
            (company.name.clone(), company.layoff(fraction))
        };

        for id in &removed {
            let Some(entity) = self.world.resource::<Population>().entity(*id) else {
                continue;
            };
            if self.world.get::<Demographics>(entity).is_some_and(|d| d.retired) {
                continue;
            }
            if let Some(mut employment) = self.world.get_mut::<Employment>(entity) {
                employment.job = Job::Unemployed;
                employment.income = 0.0;
            }
        }
        self.world.resource_mut::<EventLog>().log(EconEvent::WorkforceCut {
            company,
            count: removed.len(),
        });
        removed.len()
    }

    // === Persistence ===

    pub fn snapshot(&mut self) -> WorldSnapshot {
        persistence::capture_snapshot(&mut self.world)
    }

    pub fn restore(&mut self, snapshot: WorldSnapshot) -> Result<(), PersistenceError> {
        persistence::restore_snapshot(&mut self.world, snapshot)
    }

    /// Save the world to a JSON snapshot file
    pub fn export_world_state(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let snapshot = self.snapshot();
        persistence::save_snapshot(path.as_ref(), &snapshot)?;
        tracing::info!("World state saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a JSON snapshot file, replacing the population.
    ///
    /// Failures are logged and leave the world untouched; returns whether
    /// the load happened.
    pub fn import_world_state(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let result = persistence::load_snapshot(path).and_then(|snapshot| self.restore(snapshot));
        match result {
            Ok(()) => {
                tracing::info!("World state loaded from {}", path.display());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path.display(), e);
                false
            }
        }
    }

    // === Queries ===

    pub fn get_company_stats(&self) -> BTreeMap<Industry, CompanyStats> {
        self.companies()
            .iter()
            .map(|company| {
                (
                    company.industry,
                    CompanyStats {
                        stock_price: company.stock_price,
                        percent_change: company.percent_change(),
                    },
                )
            })
            .collect()
    }

    pub fn classify_agent(&self, agent: AgentId) -> Option<SocioeconomicClass> {
        let entity = self.population().entity(agent)?;
        let employment = self.world.get::<Employment>(entity)?;
        let finances = self.world.get::<Finances>(entity)?;
        Some(SocioeconomicClass::classify(employment.income, finances.savings))
    }

    /// Agents per class
    pub fn class_counts(&self) -> BTreeMap<SocioeconomicClass, usize> {
        let mut counts: BTreeMap<SocioeconomicClass, usize> =
            SocioeconomicClass::ALL.iter().map(|&c| (c, 0)).collect();
        for view in self.agent_views() {
            *counts.entry(view.class).or_default() += 1;
        }
        counts
    }

    pub fn agent_view(&self, agent: AgentId) -> Option<AgentView> {
        let entity = self.population().entity(agent)?;
        self.view_of(entity)
    }

    /// Views of every agent in population order
    pub fn agent_views(&self) -> Vec<AgentView> {
        self.population()
            .entities()
            .iter()
            .filter_map(|&entity| self.view_of(entity))
            .collect()
    }

    fn view_of(&self, entity: Entity) -> Option<AgentView> {
        let world = &self.world;
        Some(AgentView::new(
            world.get::<AgentId>(entity)?,
            world.get::<Demographics>(entity)?,
            world.get::<Employment>(entity)?,
            world.get::<Finances>(entity)?,
            world.get::<Wellbeing>(entity)?,
            world.get::<Movement>(entity)?,
        ))
    }

    /// Look up one component of an agent
    pub fn agent_component<C: Component>(&self, agent: AgentId) -> Option<&C> {
        let entity = self.population().entity(agent)?;
        self.world.get::<C>(entity)
    }

    pub fn population(&self) -> &Population {
        self.world.resource::<Population>()
    }

    pub fn companies(&self) -> &CompanyRegistry {
        self.world.resource::<CompanyRegistry>()
    }

    pub fn resources(&self) -> &ResourcePool {
        self.world.resource::<ResourcePool>()
    }

    pub fn demand_shocks(&self) -> &DemandShocks {
        self.world.resource::<DemandShocks>()
    }

    pub fn macro_cycle(&self) -> &MacroCycle {
        self.world.resource::<MacroCycle>()
    }

    pub fn policy(&self) -> &Policy {
        self.world.resource::<Policy>()
    }

    pub fn births(&self) -> &BirthControl {
        self.world.resource::<BirthControl>()
    }

    pub fn day_clock(&self) -> &DayClock {
        self.world.resource::<DayClock>()
    }

    pub fn market_report(&self) -> &MarketReport {
        self.world.resource::<MarketReport>()
    }

    pub fn event_log(&self) -> &EventLog {
        self.world.resource::<EventLog>()
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.day_clock().tick
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
