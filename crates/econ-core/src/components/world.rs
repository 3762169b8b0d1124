//! World Resources
//!
//! Economy-wide state held as ECS resources: demand shocks, policy levers,
//! the macro cycle, the day clock, birth controls and the population index.

use bevy_ecs::prelude::*;
use econ_events::{EconEvent, Industry, MacroPhase};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};

use super::agent::{AgentId, CommuteTarget};
use super::company::MarketPolicy;
use crate::events::EventLog;

/// Bounds of every demand multiplier.
pub const SHOCK_MIN: f64 = 0.5;
pub const SHOCK_MAX: f64 = 2.0;

/// Chance per industry per tick of a large demand jump.
pub const MAJOR_SHOCK_CHANCE: f64 = 0.01;

/// Amount the day clock and cycle timer advance per tick at speed 1.0.
pub const TICK_STEP: f64 = 0.01;

/// Slowest accepted time speed.
pub const MIN_TIME_SPEED: f64 = 0.25;

/// First id handed to a new agent.
pub const FIRST_AGENT_ID: u64 = 100_000;

/// Resource: the single seeded random source
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

/// Resource: per-industry demand multipliers, kept in [0.5, 2.0]
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DemandShocks {
    multipliers: BTreeMap<Industry, f64>,
}

impl DemandShocks {
    pub fn new(sectors: &[Industry]) -> Self {
        Self {
            multipliers: sectors.iter().map(|&i| (i, 1.0)).collect(),
        }
    }

    /// Multiplier for `industry` (1.0 for industries without a market)
    pub fn get(&self, industry: Industry) -> f64 {
        self.multipliers.get(&industry).copied().unwrap_or(1.0)
    }

    pub fn set(&mut self, industry: Industry, multiplier: f64) {
        self.multipliers
            .insert(industry, multiplier.clamp(SHOCK_MIN, SHOCK_MAX));
    }

    /// Drift every multiplier and occasionally jolt one.
    ///
    /// Shocks whose factor falls outside [0.8, 1.2] are logged.
    pub fn apply(&mut self, rng: &mut impl Rng, log: &mut EventLog) {
        for (&industry, multiplier) in self.multipliers.iter_mut() {
            let mut shock = rng.gen_range(0.95..1.05);
            if rng.gen_bool(MAJOR_SHOCK_CHANCE) {
                shock *= *[0.7, 1.3].choose(rng).unwrap_or(&1.0);
            }
            *multiplier = (*multiplier * shock).clamp(SHOCK_MIN, SHOCK_MAX);
            if !(0.8..=1.2).contains(&shock) {
                log.log(EconEvent::DemandShock {
                    industry,
                    multiplier: *multiplier,
                });
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Industry, f64)> + '_ {
        self.multipliers.iter().map(|(&i, &m)| (i, m))
    }
}

/// Resource: policy levers set by the caller
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Policy {
    pub ubi_enabled: bool,
    pub ubi_amount: f64,
    pub automation_enabled: bool,
    pub recession_enabled: bool,
    pub corporate_tax_rate: f64,
    pub price_controls_enabled: bool,
    pub price_ceiling: f64,
    pub stimulus_by_industry: BTreeMap<Industry, f64>,
}

impl Policy {
    /// The levers one company sees this tick
    pub fn market_policy(&self, industry: Industry) -> MarketPolicy {
        MarketPolicy {
            stimulus: self.stimulus_by_industry.get(&industry).copied().unwrap_or(0.0),
            tax_rate: self.corporate_tax_rate,
            price_ceiling: self.price_controls_enabled.then_some(self.price_ceiling),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            ubi_enabled: false,
            ubi_amount: 600.0,
            automation_enabled: false,
            recession_enabled: false,
            corporate_tax_rate: 0.2,
            price_controls_enabled: false,
            price_ceiling: 200.0,
            stimulus_by_industry: BTreeMap::from([
                (Industry::Education, 0.0),
                (Industry::Finance, -0.05),
                (Industry::Healthcare, 0.05),
                (Industry::Retail, 0.0),
                (Industry::Tech, 0.1),
            ]),
        }
    }
}

/// Resource: the boom / recession / stagnation business cycle
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MacroCycle {
    pub phase: MacroPhase,
    /// Annual rate
    pub inflation_rate: f64,
    pub timer: f64,
    pub length: f64,
}

impl MacroCycle {
    /// Advance the timer by `step`; rotates the phase once the timer exceeds
    /// the cycle length. Returns the new phase on rotation.
    pub fn advance(&mut self, step: f64) -> Option<MacroPhase> {
        self.timer += step;
        if self.timer <= self.length {
            return None;
        }
        self.timer = 0.0;
        self.phase = self.phase.next();
        self.inflation_rate = self.phase.inflation_rate();
        Some(self.phase)
    }

    /// Month-equivalent of the annual inflation rate
    pub fn monthly_inflation(&self) -> f64 {
        (1.0 + self.inflation_rate).powf(1.0 / 12.0) - 1.0
    }
}

impl Default for MacroCycle {
    fn default() -> Self {
        Self {
            phase: MacroPhase::Boom,
            inflation_rate: MacroPhase::Boom.inflation_rate(),
            timer: 0.0,
            length: 100.0,
        }
    }
}

/// Resource: time of day, speed and pause state
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DayClock {
    /// Fraction of the day in [0, 1)
    pub day_time: f64,
    pub time_speed: f64,
    pub paused: bool,
    /// Ticks run so far
    pub tick: u64,
}

impl DayClock {
    /// Set the time multiplier, floored at `MIN_TIME_SPEED`. Non-finite
    /// speeds fall back to 1.0.
    pub fn set_time_speed(&mut self, speed: f64) {
        self.time_speed = if speed.is_finite() {
            speed.max(MIN_TIME_SPEED)
        } else {
            1.0
        };
    }

    /// Set the position in the day, wrapped into [0, 1)
    pub fn set_day_time(&mut self, day_time: f64) {
        self.day_time = if day_time.is_finite() {
            day_time.rem_euclid(1.0)
        } else {
            0.0
        };
    }

    pub fn advance(&mut self) {
        self.day_time = (self.day_time + TICK_STEP * self.time_speed).rem_euclid(1.0);
    }

    /// Where agents head at this time of day
    pub fn commute_target(&self) -> CommuteTarget {
        if (0.33..0.66).contains(&self.day_time) {
            CommuteTarget::Work
        } else {
            CommuteTarget::Home
        }
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self {
            day_time: 0.0,
            time_speed: 1.0,
            paused: false,
            tick: 0,
        }
    }
}

/// Resource: birth pacing and the population cap
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct BirthControl {
    pub spawn_enabled: bool,
    /// Births per second
    pub spawn_rate: f64,
    pub max_population: usize,
    /// Elapsed seconds at the last birth
    pub last_birth: f64,
}

impl BirthControl {
    /// Seconds between births
    pub fn interval(&self) -> f64 {
        1.0 / self.spawn_rate.max(0.01)
    }

    pub fn is_due(&self, elapsed: f64, population: usize) -> bool {
        self.spawn_enabled
            && population < self.max_population
            && elapsed - self.last_birth >= self.interval()
    }
}

impl Default for BirthControl {
    fn default() -> Self {
        Self {
            spawn_enabled: true,
            spawn_rate: 0.1,
            max_population: 1000,
            last_birth: 0.0,
        }
    }
}

/// Resource: agent entities in insertion order, plus an id index
#[derive(Resource, Debug, Clone)]
pub struct Population {
    order: Vec<Entity>,
    by_id: HashMap<AgentId, Entity>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
            next_id: FIRST_AGENT_ID,
        }
    }

    /// Hand out a fresh id, never one already tracked.
    ///
    /// Wraps around past `u64::MAX`.
    pub fn allocate_id(&mut self) -> AgentId {
        while self.by_id.contains_key(&AgentId(self.next_id)) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = AgentId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Track a spawned agent. Ids from outside (imports, manual adds)
    /// bump the allocator past them.
    pub fn insert(&mut self, id: AgentId, entity: Entity) {
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.order.push(entity);
        self.by_id.insert(id, entity);
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    /// Entities in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every agent; returns the entities so they can be despawned
    pub fn clear(&mut self) -> Vec<Entity> {
        self.by_id.clear();
        std::mem::take(&mut self.order)
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

/// Resource: figures from the last market pass
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MarketReport {
    pub total_output: u64,
    pub consumer_demand: u64,
    pub commodity_demand: u64,
    /// Month-equivalent inflation used this tick
    pub monthly_inflation: f64,
}

/// Resource: per-tick life-cycle rates
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LifecycleRates {
    /// Years of age per tick at speed 1.0
    pub aging_rate: f64,
    pub health_decay: f64,
    pub insured_recovery: f64,
    pub transition_rate: f64,
}

impl Default for LifecycleRates {
    fn default() -> Self {
        Self {
            aging_rate: 0.001,
            health_decay: 0.02,
            insured_recovery: 0.01,
            transition_rate: 0.03,
        }
    }
}
