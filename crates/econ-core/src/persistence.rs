//! Snapshot Persistence
//!
//! Converts the live world to and from the versioned snapshot schema and
//! reads/writes snapshot documents as JSON.
//!
//! Import is lenient: missing agent fields take the schema defaults, talent
//! dimensions missing from a record default to 0.5, labels that do not
//! parse are reported and replaced, and unknown keys are reported and
//! dropped. State the schema does not carry is restored as education
//! `None`, zero savings and debt, and an income history of `[income]`.

use bevy_ecs::prelude::*;
use econ_events::{AgentRecord, ConfigRecord, Industry, WorldSnapshot, SNAPSHOT_VERSION};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::components::agent::{
    AgentBundle, AgentId, Demographics, Employment, Finances, Lineage, Movement, Talents,
    Traits, Transition, Wellbeing,
};
use crate::components::career::{Career, CareerPath, Education, EducationPath, Hobby, Job, Talent};
use crate::components::world::{BirthControl, DayClock, Policy, Population};
use crate::config::ConfigPatch;

/// Talent level for dimensions a record leaves out
pub const DEFAULT_TALENT: f64 = 0.5;

/// Error type for snapshot files
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Borrowed view of every component a record is built from
pub type AgentComponents<'a> = (
    &'a AgentId,
    &'a Demographics,
    &'a Traits,
    &'a Employment,
    &'a Finances,
    &'a Wellbeing,
    &'a Movement,
    &'a Transition,
    &'a Lineage,
);

/// Build the saved form of one agent
pub fn agent_to_record(agent: AgentComponents<'_>) -> AgentRecord {
    let (id, demographics, traits, employment, finances, wellbeing, movement, transition, lineage) =
        agent;
    let path = &employment.path;
    AgentRecord {
        id: Some(id.0),
        age: demographics.age,
        retirement_age: demographics.retirement_age,
        retired: demographics.retired,
        pension: demographics.pension,
        job: employment.job.label().to_string(),
        income: employment.income,
        industry: employment
            .industry
            .map_or_else(|| "None".to_string(), |i| i.to_string()),
        health: wellbeing.health,
        has_insurance: wellbeing.has_insurance,
        cost_of_living: finances.cost_of_living,
        transitioning: transition.transitioning,
        transition_progress: transition.progress,
        home_coords: movement.home,
        x: movement.x,
        y: movement.y,
        at_work: movement.at_work,
        talents: traits
            .talents
            .iter()
            .map(|(talent, value)| (talent.as_str().to_string(), value))
            .collect(),
        hobbies: traits.hobbies.iter().map(|h| h.to_string()).collect(),
        education_path: path.education_path.map(|p| p.to_string()),
        career_path: path.career.map(|c| c.to_string()),
        education_years: path.education_years,
        education_cost: path.education_cost,
        career_entry_age: path.career_entry_age,
        career_decision_debug: path.decision_trace.clone(),
        parent_id: lineage.parent_id.map(|p| p.0),
        generation: lineage.generation,
        unknown: Default::default(),
    }
}

/// Rebuild an agent from its saved form under `id`
pub fn record_to_agent(record: &AgentRecord, id: AgentId) -> AgentBundle {
    if !record.unknown.is_empty() {
        let keys: Vec<&str> = record.unknown.keys().map(String::as_str).collect();
        tracing::warn!("Agent {}: ignoring unknown fields {:?}", id, keys);
    }

    let mut talents = Talents::uniform(DEFAULT_TALENT);
    for (name, &value) in &record.talents {
        match Talent::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(name)) {
            Some(talent) => talents.set(talent, value),
            None => tracing::warn!("Agent {}: ignoring unknown talent '{}'", id, name),
        }
    }
    let hobbies = record
        .hobbies
        .iter()
        .filter_map(|label| parse_or_warn::<Hobby>(id, label))
        .collect();

    let mut demographics = Demographics {
        education: Education::None,
        age: record.age,
        retirement_age: record.retirement_age,
        retired: record.retired,
        pension: record.pension,
    };

    let industry = match record.industry.as_str() {
        "None" | "" => None,
        label => parse_or_warn::<Industry>(id, label),
    };
    let mut employment = Employment {
        job: Job::from(record.job.as_str()),
        industry,
        income: record.income,
        path: CareerPath {
            education_path: record
                .education_path
                .as_deref()
                .and_then(|label| parse_or_warn::<EducationPath>(id, label)),
            career: record
                .career_path
                .as_deref()
                .and_then(|label| parse_or_warn::<Career>(id, label)),
            education_years: record.education_years,
            education_cost: record.education_cost,
            career_entry_age: record.career_entry_age,
            decision_trace: record.career_decision_debug.clone(),
        },
    };
    if demographics.retired || employment.job == Job::Retired {
        demographics.retired = true;
        employment.retire(demographics.pension);
    }

    let mut finances = Finances::new(0.0, 0.0, record.cost_of_living);
    finances.record_income(employment.income);

    AgentBundle {
        id,
        demographics,
        traits: Traits { talents, hobbies },
        employment,
        finances,
        wellbeing: Wellbeing {
            health: record.health.clamp(0.0, 100.0),
            has_insurance: record.has_insurance,
        },
        movement: Movement {
            x: record.x,
            y: record.y,
            home: record.home_coords,
            at_work: record.at_work,
        },
        transition: Transition {
            transitioning: record.transitioning,
            progress: record.transition_progress,
        },
        lineage: Lineage {
            parent_id: record.parent_id.map(AgentId),
            generation: record.generation,
        },
    }
}

fn parse_or_warn<T>(id: AgentId, label: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match label.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Agent {}: {}", id, e);
            None
        }
    }
}

/// Capture the population, population/policy settings and clock
pub fn capture_snapshot(world: &mut World) -> WorldSnapshot {
    let entities = world.resource::<Population>().entities().to_vec();
    let mut query = world.query::<AgentComponents<'_>>();
    let agents: Vec<AgentRecord> = entities
        .into_iter()
        .filter_map(|entity| query.get(world, entity).ok())
        .map(agent_to_record)
        .collect();

    let births = world.resource::<BirthControl>();
    let policy = world.resource::<Policy>();
    let clock = world.resource::<DayClock>();
    WorldSnapshot {
        version: SNAPSHOT_VERSION,
        agents,
        config: ConfigRecord {
            spawn_rate: Some(births.spawn_rate),
            max_population: Some(births.max_population),
            ubi_enabled: Some(policy.ubi_enabled),
            automation_enabled: Some(policy.automation_enabled),
            recession_enabled: Some(policy.recession_enabled),
            ubi_amount: Some(policy.ubi_amount),
            unknown: Default::default(),
        },
        day_time: clock.day_time,
        time_speed: clock.time_speed,
        unknown: Default::default(),
    }
}

/// Replace the population with the snapshot's agents and merge its
/// settings into the world.
///
/// The version is checked before anything is touched, so an error leaves
/// the world as it was.
pub fn restore_snapshot(world: &mut World, snapshot: WorldSnapshot) -> Result<(), PersistenceError> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: snapshot.version,
            supported: SNAPSHOT_VERSION,
        });
    }
    if !snapshot.unknown.is_empty() {
        let keys: Vec<&str> = snapshot.unknown.keys().map(String::as_str).collect();
        tracing::warn!("Snapshot: ignoring unknown fields {:?}", keys);
    }

    let stale = world.resource_mut::<Population>().clear();
    for entity in stale {
        world.despawn(entity);
    }

    for record in &snapshot.agents {
        let id = {
            let mut population = world.resource_mut::<Population>();
            match record.id.map(AgentId) {
                Some(id) if !population.contains(id) => id,
                Some(id) => {
                    let fresh = population.allocate_id();
                    tracing::warn!("Duplicate agent id {} in snapshot, reassigned {}", id, fresh);
                    fresh
                }
                None => population.allocate_id(),
            }
        };
        let bundle = record_to_agent(record, id);
        let entity = world.spawn(bundle).id();
        world.resource_mut::<Population>().insert(id, entity);
    }

    let patch = ConfigPatch::from(snapshot.config);
    if !patch.unknown.is_empty() {
        let keys: Vec<&str> = patch.unknown.keys().map(String::as_str).collect();
        tracing::warn!("Snapshot config: ignoring unknown keys {:?}", keys);
    }
    patch.apply_to_policy(&mut world.resource_mut::<Policy>());
    patch.apply_to_births(&mut world.resource_mut::<BirthControl>());

    let mut clock = world.resource_mut::<DayClock>();
    clock.set_day_time(snapshot.day_time);
    clock.set_time_speed(snapshot.time_speed);

    tracing::info!("Restored {} agents", snapshot.agents.len());
    Ok(())
}

/// Write a snapshot as pretty-printed JSON
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &WorldSnapshot) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a snapshot document
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<WorldSnapshot, PersistenceError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn record_of(bundle: &AgentBundle) -> AgentRecord {
        agent_to_record((
            &bundle.id,
            &bundle.demographics,
            &bundle.traits,
            &bundle.employment,
            &bundle.finances,
            &bundle.wellbeing,
            &bundle.movement,
            &bundle.transition,
            &bundle.lineage,
        ))
    }

    #[test]
    fn test_record_round_trip() {
        let mut rng = SmallRng::seed_from_u64(21);
        for i in 0..50 {
            let bundle = AgentBundle::random(AgentId(100_000 + i), &mut rng);
            let record = record_of(&bundle);
            let json = serde_json::to_string(&record).unwrap();
            let parsed: AgentRecord = serde_json::from_str(&json).unwrap();
            let restored = record_to_agent(&parsed, bundle.id);
            assert_eq!(record_of(&restored), record);
        }
    }

    #[test]
    fn test_missing_talents_default() {
        let record: AgentRecord =
            serde_json::from_str(r#"{"talents": {"logical": 1.7, "charisma": 0.2}}"#).unwrap();
        let agent = record_to_agent(&record, AgentId(1));
        assert_eq!(agent.traits.talents.get(Talent::Logical), 1.0);
        assert_eq!(agent.traits.talents.get(Talent::Social), DEFAULT_TALENT);
        assert_eq!(agent.finances.savings, 0.0);
        assert_eq!(agent.finances.income_history().len(), 1);
    }

    #[test]
    fn test_retired_record_is_normalized() {
        let record: AgentRecord = serde_json::from_str(
            r#"{"retired": true, "job": "Doctor", "income": 12000, "pension": 900, "industry": "Healthcare"}"#,
        )
        .unwrap();
        let agent = record_to_agent(&record, AgentId(1));
        assert_eq!(agent.employment.job, Job::Retired);
        assert_eq!(agent.employment.income, 900.0);
        assert_eq!(agent.employment.industry, None);
    }

    #[test]
    fn test_bad_labels_are_dropped() {
        let record: AgentRecord = serde_json::from_str(
            r#"{"industry": "Piracy", "hobbies": ["Music", "Knitting"], "education_path": "Bootcamp"}"#,
        )
        .unwrap();
        let agent = record_to_agent(&record, AgentId(1));
        assert_eq!(agent.employment.industry, None);
        assert_eq!(agent.traits.hobbies, vec![Hobby::Music]);
        assert_eq!(agent.employment.path.education_path, None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_snapshot("/nonexistent/savegame.json").unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(PersistenceError::Json(_))));
    }
}
