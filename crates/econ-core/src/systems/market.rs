//! Market Pass
//!
//! Runs every company's drift, inflation and production step against the
//! shared pool, then regenerates resources and logs the tick's output.

use bevy_ecs::prelude::*;
use econ_events::EconEvent;
use rand::Rng;

use crate::components::company::CompanyRegistry;
use crate::components::pool::ResourcePool;
use crate::components::world::{DemandShocks, MacroCycle, MarketReport, Policy, SimRng};
use crate::events::EventLog;

/// Range of the consumer-goods demand pool.
pub const CONSUMER_DEMAND: std::ops::RangeInclusive<u64> = 100..=500;

/// Range of the commodities demand pool.
pub const COMMODITY_DEMAND: std::ops::RangeInclusive<u64> = 50..=200;

/// System: one production and sales step for every company.
///
/// Companies run in industry order. Each one drifts, has its revenue
/// inflated by a month of inflation, then produces against the pool.
#[allow(clippy::too_many_arguments)]
pub fn run_market(
    cycle: Res<MacroCycle>,
    policy: Res<Policy>,
    shocks: Res<DemandShocks>,
    mut registry: ResMut<CompanyRegistry>,
    mut pool: ResMut<ResourcePool>,
    mut report: ResMut<MarketReport>,
    mut rng: ResMut<SimRng>,
    mut log: ResMut<EventLog>,
) {
    let monthly_inflation = cycle.monthly_inflation();
    let rng = &mut rng.0;
    let consumer_demand = rng.gen_range(CONSUMER_DEMAND);
    let commodity_demand = rng.gen_range(COMMODITY_DEMAND);

    let mut total_output = 0;
    for company in registry.iter_mut() {
        company.drift(rng);
        company.apply_inflation(monthly_inflation);

        let demand = if company.industry.is_consumer_facing() {
            consumer_demand
        } else {
            commodity_demand
        };
        let sold = company.produce_and_sell(
            &mut pool,
            demand,
            shocks.get(company.industry),
            &policy.market_policy(company.industry),
            &mut log,
        );
        total_output += sold;
    }

    *report = MarketReport {
        total_output,
        consumer_demand,
        commodity_demand,
        monthly_inflation,
    };
}

/// System: regenerate and spoil the shared resource pool
pub fn regenerate_resources(mut pool: ResMut<ResourcePool>) {
    pool.regenerate();
}

/// System: record the tick's total market output
pub fn log_market_output(report: Res<MarketReport>, mut log: ResMut<EventLog>) {
    tracing::debug!("Total market output: {}", report.total_output);
    log.log(EconEvent::MarketOutput {
        total: report.total_output,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::company::Company;
    use econ_events::{Industry, Resource};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn world(pool: ResourcePool) -> World {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut world = World::new();
        world.insert_resource(MacroCycle::default());
        world.insert_resource(Policy::default());
        world.insert_resource(DemandShocks::new(&Industry::MARKET_SECTORS));
        world.insert_resource(CompanyRegistry::for_sectors(&Industry::MARKET_SECTORS, &mut rng));
        world.insert_resource(pool);
        world.insert_resource(MarketReport::default());
        world.insert_resource(SimRng::from_seed(8));
        world.insert_resource(EventLog::new(256));
        world
    }

    fn market_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((run_market, regenerate_resources, log_market_output).chain());
        schedule
    }

    #[test]
    fn test_market_pass_reports_output() {
        let mut world = world(ResourcePool::default());
        market_schedule().run(&mut world);

        let report = world.resource::<MarketReport>().clone();
        assert!(CONSUMER_DEMAND.contains(&report.consumer_demand));
        assert!(COMMODITY_DEMAND.contains(&report.commodity_demand));
        let sold: u64 = world
            .resource::<CompanyRegistry>()
            .iter()
            .map(|c| c.sold_last_tick)
            .sum();
        assert_eq!(report.total_output, sold);

        let last = world.resource::<EventLog>().recent(1).next().cloned().unwrap();
        assert_eq!(last.event, EconEvent::MarketOutput { total: sold });
    }

    #[test]
    fn test_empty_pool_only_regenerates() {
        let empty = ResourcePool::from_quantities(Resource::ALL.map(|r| (r, 0)));
        let mut world = world(empty);
        market_schedule().run(&mut world);

        let pool = world.resource::<ResourcePool>();
        assert_eq!(pool.get(Resource::Water), 50);
        assert_eq!(pool.get(Resource::Labor), 20);
        assert_eq!(world.resource::<MarketReport>().total_output, 0);
        let shortages = world
            .resource::<EventLog>()
            .entries()
            .filter(|e| matches!(e.event, EconEvent::Shortage { .. }))
            .count();
        assert_eq!(shortages, 5);
    }

    #[test]
    fn test_price_floor_holds_under_scarcity() {
        let mut world = world(ResourcePool::new(200));
        let mut schedule = market_schedule();
        for _ in 0..500 {
            schedule.run(&mut world);
            for company in world.resource::<CompanyRegistry>().iter() {
                assert!(company.price >= 10.0);
            }
        }
        // Regeneration cannot keep up with five companies: shortages recur
        assert!(world
            .resource::<EventLog>()
            .entries()
            .any(|e| matches!(e.event, EconEvent::Shortage { .. })));
    }

    #[test]
    fn test_registered_company_uses_fallback_demand_pool() {
        let mut world = world(ResourcePool::default());
        let mut rng = SmallRng::seed_from_u64(1);
        world
            .resource_mut::<CompanyRegistry>()
            .register(Company::new(Industry::Logistics, &mut rng));
        market_schedule().run(&mut world);
        let report = world.resource::<MarketReport>().clone();
        let logistics = world.resource::<CompanyRegistry>().get(Industry::Logistics).unwrap().clone();
        assert!(logistics.sold_last_tick <= report.commodity_demand);
    }
}
