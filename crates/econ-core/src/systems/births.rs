//! Births
//!
//! New agents arrive at `spawn_rate` per second of elapsed time until the
//! population cap is reached.

use bevy_ecs::prelude::*;
use econ_events::EconEvent;

use crate::clock::TimeKeeper;
use crate::components::agent::AgentBundle;
use crate::components::world::{BirthControl, DayClock, Population, SimRng};
use crate::events::EventLog;

/// Spawn an agent entity and index it in the population
pub fn spawn_agent(world: &mut World, bundle: AgentBundle) -> Entity {
    let id = bundle.id;
    let parent_id = bundle.lineage.parent_id.map(|p| p.0);
    let entity = world.spawn(bundle).id();
    world.resource_mut::<Population>().insert(id, entity);
    world.resource_mut::<EventLog>().log(EconEvent::Birth {
        agent_id: id.0,
        parent_id,
    });
    entity
}

/// System: spawn one random agent when a birth is due.
///
/// Exclusive because it spawns entities and touches several resources.
pub fn spawn_births(world: &mut World) {
    let time_speed = world.resource::<DayClock>().time_speed;
    let elapsed = {
        let mut keeper = world.resource_mut::<TimeKeeper>();
        keeper.on_tick(time_speed);
        keeper.elapsed()
    };

    let population = world.resource::<Population>().len();
    if !world.resource::<BirthControl>().is_due(elapsed, population) {
        return;
    }

    let id = world.resource_mut::<Population>().allocate_id();
    let bundle = {
        let mut rng = world.resource_mut::<SimRng>();
        AgentBundle::random(id, &mut rng.0)
    };
    spawn_agent(world, bundle);
    world.resource_mut::<BirthControl>().last_birth = elapsed;
    tracing::info!("Agent {} born ({} agents)", id, population + 1);
}
