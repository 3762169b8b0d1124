//! ECS Systems
//!
//! Births, macro state, the market pass, career decisions and the agent
//! pass, plus the schedule that runs them in tick order.

pub mod agents;
pub mod births;
pub mod cycle;
pub mod decision;
pub mod market;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

pub use agents::{run_agent_pass, step_agent, AgentContext, AgentMut};
pub use births::{spawn_agent, spawn_births};
pub use cycle::{
    advance_clock, advance_macro_cycle, apply_demand_shocks, begin_tick, churn_company_phases,
};
pub use decision::{
    apply_decision, decide_career_path, pick_career, transition_career, CareerDecision, PathScore,
};
pub use market::{log_market_output, regenerate_resources, run_market};

/// Build the schedule for one tick.
///
/// Systems run strictly in sequence on one thread: births, clock, macro
/// cycle, demand shocks, company phases, market, resource regeneration,
/// output logging, then every agent.
pub fn build_tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);

    // Macro state for the tick is settled first
    schedule.add_systems(
        (
            begin_tick,
            spawn_births,
            advance_clock,
            advance_macro_cycle,
            apply_demand_shocks,
            churn_company_phases,
        )
            .chain(),
    );

    // Companies produce against the settled macro state, then agents react
    schedule.add_systems(
        (run_market, regenerate_resources, log_market_output, run_agent_pass)
            .chain()
            .after(churn_company_phases),
    );

    schedule
}
