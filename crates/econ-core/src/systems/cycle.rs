//! Macro State Systems
//!
//! Clock, business cycle, demand shocks and company phase churn. All of
//! these run before the market pass so a tick's macro state is final by
//! the time companies produce.

use bevy_ecs::prelude::*;
use econ_events::{CompanyPhase, EconEvent};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::company::CompanyRegistry;
use crate::components::world::{DayClock, DemandShocks, MacroCycle, SimRng, TICK_STEP};
use crate::events::EventLog;

/// Chance per company per tick of a new random phase.
pub const PHASE_CHURN_CHANCE: f64 = 0.01;

/// System: count the tick and stamp the event log with it
pub fn begin_tick(mut clock: ResMut<DayClock>, mut log: ResMut<EventLog>) {
    clock.tick += 1;
    log.set_tick(clock.tick);
}

/// System: advance the time of day
pub fn advance_clock(mut clock: ResMut<DayClock>) {
    clock.advance();
}

/// System: advance the cycle timer and rotate the phase when it runs out
pub fn advance_macro_cycle(
    clock: Res<DayClock>,
    mut cycle: ResMut<MacroCycle>,
    mut log: ResMut<EventLog>,
) {
    if let Some(phase) = cycle.advance(TICK_STEP * clock.time_speed) {
        tracing::info!(
            "Economic cycle advanced to {} (inflation {:.2}%)",
            phase,
            cycle.inflation_rate * 100.0
        );
        log.log(EconEvent::CycleAdvanced {
            phase,
            inflation_rate: cycle.inflation_rate,
        });
    }
}

/// System: drift and jolt every industry's demand multiplier
pub fn apply_demand_shocks(
    mut shocks: ResMut<DemandShocks>,
    mut rng: ResMut<SimRng>,
    mut log: ResMut<EventLog>,
) {
    shocks.apply(&mut rng.0, &mut log);
}

/// System: occasionally reassign each company's boom / bust / neutral phase
pub fn churn_company_phases(mut registry: ResMut<CompanyRegistry>, mut rng: ResMut<SimRng>) {
    let rng = &mut rng.0;
    for company in registry.iter_mut() {
        if rng.gen_bool(PHASE_CHURN_CHANCE) {
            company.phase = *CompanyPhase::ALL.choose(rng).unwrap_or(&CompanyPhase::Neutral);
            tracing::debug!("{} entered {} phase", company.name, company.phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econ_events::{Industry, MacroPhase};

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(DayClock::default());
        world.insert_resource(MacroCycle::default());
        world.insert_resource(EventLog::new(128));
        world.insert_resource(SimRng::from_seed(42));
        world.insert_resource(DemandShocks::new(&Industry::MARKET_SECTORS));
        world
    }

    #[test]
    fn test_clock_stamps_event_log() {
        let mut world = world();
        let mut schedule = Schedule::default();
        schedule.add_systems((begin_tick, advance_clock).chain());
        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.resource::<DayClock>().tick, 2);
        assert_eq!(world.resource::<EventLog>().current_tick(), 2);
        assert!((world.resource::<DayClock>().day_time - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_cycle_logs_rotation() {
        let mut world = world();
        world.resource_mut::<MacroCycle>().length = 0.005;
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_macro_cycle);
        schedule.run(&mut world);

        assert_eq!(world.resource::<MacroCycle>().phase, MacroPhase::Recession);
        let log = world.resource::<EventLog>();
        assert_eq!(
            log.lines()[0],
            "[tick 0] Economic cycle advanced to recession (Inflation: 4.00%)"
        );
    }

    #[test]
    fn test_time_speed_scales_cycle() {
        let mut world = world();
        world.resource_mut::<DayClock>().time_speed = 10.0;
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_macro_cycle);
        schedule.run(&mut world);
        assert!((world.resource::<MacroCycle>().timer - 0.1).abs() < 1e-12);
    }
}
