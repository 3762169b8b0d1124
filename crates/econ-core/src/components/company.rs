//! Company Components
//!
//! One company per market sector: production against the shared resource
//! pool, market clearing, price elasticity and a slow financial drift.

use bevy_ecs::prelude::*;
use econ_events::{CompanyPhase, EconEvent, Industry, Resource};
use rand::Rng;
use std::collections::BTreeMap;

use super::agent::AgentId;
use super::pool::ResourcePool;
use crate::events::EventLog;

/// Lowest price a company will ever charge.
pub const PRICE_FLOOR: f64 = 10.0;

/// Lowest revenue the financial drift lets a company fall to.
pub const REVENUE_FLOOR: f64 = 10_000.0;

/// Units produced per batch at a production factor of 1.0.
pub const BATCH_SIZE: f64 = 10.0;

/// Starting unit price.
pub const INITIAL_PRICE: f64 = 100.0;

/// Resources consumed per batch by a company in `industry`.
pub fn recipe(industry: Industry) -> BTreeMap<Resource, u64> {
    use Resource::*;
    let pairs: &[(Resource, u64)] = match industry {
        Industry::Tech => &[(Steel, 10), (Energy, 20), (Labor, 5)],
        Industry::Healthcare => &[(Water, 5), (Labor, 10), (Energy, 5)],
        Industry::Retail => &[(Labor, 8), (Energy, 5)],
        Industry::Finance => &[(Energy, 3), (Labor, 2)],
        Industry::Education => &[(Labor, 10), (Energy, 2)],
        _ => &[(Labor, 5), (Energy, 2)],
    };
    pairs.iter().copied().collect()
}

/// Policy levers as seen by a single company for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketPolicy {
    /// Extra production factor for this company's industry (only positive values apply)
    pub stimulus: f64,
    pub tax_rate: f64,
    /// Set when price controls are on
    pub price_ceiling: Option<f64>,
}

/// A sector company
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub name: String,
    pub industry: Industry,
    pub revenue: f64,
    pub stock_price: f64,
    /// Random-walk drift added to each tick's performance
    pub growth: f64,
    pub resources_required: BTreeMap<Resource, u64>,
    pub stockpile: u64,
    pub price: f64,
    pub products_produced: u64,
    pub sold_last_tick: u64,
    pub phase: CompanyPhase,
    /// Non-owning references to hired agents, most recent last
    pub employees: Vec<AgentId>,
}

impl Company {
    /// A company for `industry` with randomized finances
    pub fn new(industry: Industry, rng: &mut impl Rng) -> Self {
        let revenue = f64::from(rng.gen_range(100_000..=1_000_000u32));
        let stock_price = (rng.gen_range(10.0..100.0f64) * 100.0).round() / 100.0;
        let growth = rng.gen_range(-0.05..0.05);
        Self {
            name: industry.as_str().to_string(),
            industry,
            revenue,
            stock_price,
            growth,
            resources_required: recipe(industry),
            stockpile: 0,
            price: INITIAL_PRICE,
            products_produced: 0,
            sold_last_tick: 0,
            phase: CompanyPhase::Neutral,
            employees: Vec::new(),
        }
    }

    pub fn with_requirements(mut self, requirements: impl IntoIterator<Item = (Resource, u64)>) -> Self {
        self.resources_required = requirements.into_iter().collect();
        self
    }

    /// Produce one batch and clear it against demand.
    ///
    /// Production is all-or-nothing: if any required resource is short the
    /// pool is left untouched, a shortage is logged and nothing is sold.
    /// Returns the number of units sold.
    pub fn produce_and_sell(
        &mut self,
        pool: &mut ResourcePool,
        market_demand: u64,
        demand_multiplier: f64,
        policy: &MarketPolicy,
        log: &mut EventLog,
    ) -> u64 {
        let (mut production_factor, mut price_factor) = self.phase.factors();
        if policy.stimulus > 0.0 {
            production_factor += policy.stimulus;
        }
        if policy.tax_rate > 0.0 {
            price_factor -= policy.tax_rate * 0.01;
        }
        if let Some(ceiling) = policy.price_ceiling {
            self.price = self.price.min(ceiling).max(PRICE_FLOOR);
        }

        if let Some(short) = self
            .resources_required
            .iter()
            .find(|&(&resource, &amount)| !pool.covers(resource, amount as f64 * production_factor))
            .map(|(&resource, _)| resource)
        {
            tracing::warn!("{} cannot produce: short of {}", self.name, short);
            log.log(EconEvent::Shortage {
                company: self.name.clone(),
                resource: short,
            });
            self.sold_last_tick = 0;
            return 0;
        }

        for (&resource, &amount) in &self.resources_required {
            pool.withdraw(resource, (amount as f64 * production_factor) as u64);
        }
        let produced = (BATCH_SIZE * production_factor) as u64;
        self.products_produced += produced;
        self.stockpile += produced;

        let effective_demand = (market_demand as f64 * demand_multiplier).floor() as u64;
        let sold = self.stockpile.min(effective_demand);
        let gross = (sold as f64 * self.price * price_factor).floor();
        let net_income = (gross * (1.0 - policy.tax_rate)).floor();
        self.revenue += net_income;
        self.sold_last_tick = sold;
        self.stockpile -= sold;

        let demand = effective_demand as f64;
        if (sold as f64) < demand * 0.5 {
            self.price = (self.price * 0.95).max(PRICE_FLOOR);
            log.log(EconEvent::PriceDropped {
                company: self.name.clone(),
                price: self.price,
            });
        } else if sold as f64 > demand * 0.9 {
            self.price *= 1.05;
            log.log(EconEvent::PriceSpiked {
                company: self.name.clone(),
                price: self.price,
            });
        }

        sold
    }

    /// One tick of stock-price and revenue drift.
    ///
    /// Performance uses the growth from before this tick's random walk step.
    pub fn drift(&mut self, rng: &mut impl Rng) {
        let performance = rng.gen_range(-0.03..0.03) + self.growth;
        self.stock_price = (self.stock_price * (1.0 + performance)).max(1.0);
        self.revenue = (self.revenue * (1.0 + performance)).max(REVENUE_FLOOR);
        self.growth += rng.gen_range(-0.005..0.005);
    }

    pub fn apply_inflation(&mut self, monthly_rate: f64) {
        self.revenue *= 1.0 + monthly_rate;
    }

    /// Add `agent` to the payroll. Returns false if already on it.
    pub fn hire(&mut self, agent: AgentId) -> bool {
        if self.employs(agent) {
            return false;
        }
        self.employees.push(agent);
        true
    }

    /// Take `agent` off the payroll. Returns whether they were on it.
    pub fn release(&mut self, agent: AgentId) -> bool {
        let before = self.employees.len();
        self.employees.retain(|&id| id != agent);
        self.employees.len() != before
    }

    pub fn employs(&self, agent: AgentId) -> bool {
        self.employees.contains(&agent)
    }

    /// Drop the most recent `floor(len * fraction)` employees and return them
    pub fn layoff(&mut self, fraction: f64) -> Vec<AgentId> {
        let count = (self.employees.len() as f64 * fraction.clamp(0.0, 1.0)) as usize;
        let keep = self.employees.len() - count;
        let mut released = self.employees.split_off(keep);
        released.reverse();
        released
    }

    /// Percentage change implied by the current growth drift
    pub fn percent_change(&self) -> f64 {
        self.growth * 100.0
    }
}

/// Resource: every company, keyed by industry
#[derive(Resource, Debug, Clone, Default)]
pub struct CompanyRegistry {
    companies: BTreeMap<Industry, Company>,
}

impl CompanyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One company per market sector
    pub fn for_sectors(sectors: &[Industry], rng: &mut impl Rng) -> Self {
        let mut registry = Self::new();
        for &industry in sectors {
            registry.register(Company::new(industry, rng));
        }
        registry
    }

    /// Register a company, replacing any existing one for the same industry
    pub fn register(&mut self, company: Company) {
        self.companies.insert(company.industry, company);
    }

    pub fn get(&self, industry: Industry) -> Option<&Company> {
        self.companies.get(&industry)
    }

    pub fn get_mut(&mut self, industry: Industry) -> Option<&mut Company> {
        self.companies.get_mut(&industry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Company> {
        self.companies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
