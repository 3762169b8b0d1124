//! Snapshot Types
//!
//! Versioned serialization records for saving and restoring a world.
//!
//! A snapshot document holds the agent population, the population/policy
//! configuration and the clock. Every field has a documented default so
//! partially written or older documents still load; keys the schema does
//! not know are kept in `unknown` so callers can report them instead of
//! silently applying them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Keys present in a document that the schema does not recognise.
pub type UnknownFields = BTreeMap<String, serde_json::Value>;

/// One saved world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    /// Schema version (defaults to 1 for unversioned documents)
    pub version: u32,
    pub agents: Vec<AgentRecord>,
    pub config: ConfigRecord,
    /// Position in the day cycle, [0, 1)
    pub day_time: f64,
    pub time_speed: f64,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: UnknownFields,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            agents: Vec::new(),
            config: ConfigRecord::default(),
            day_time: 0.0,
            time_speed: 1.0,
            unknown: UnknownFields::new(),
        }
    }
}

/// Saved agent state.
///
/// Defaults for missing fields (see `Default`): a working-age, unemployed,
/// healthy agent living at the work centre with no recorded education
/// decision and no lineage. Missing talents are filled in by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentRecord {
    /// Missing ids are replaced with a freshly allocated one on import
    pub id: Option<u64>,
    pub age: f64,
    pub retirement_age: u32,
    pub retired: bool,
    pub pension: f64,
    pub job: String,
    pub income: f64,
    pub industry: String,
    pub health: f64,
    pub has_insurance: bool,
    pub cost_of_living: f64,
    pub transitioning: bool,
    pub transition_progress: f64,
    pub home_coords: (i32, i32),
    pub x: i32,
    pub y: i32,
    pub at_work: bool,
    pub talents: BTreeMap<String, f64>,
    pub hobbies: Vec<String>,
    pub education_path: Option<String>,
    pub career_path: Option<String>,
    pub education_years: Option<u32>,
    pub education_cost: Option<u32>,
    pub career_entry_age: Option<f64>,
    pub career_decision_debug: Option<String>,
    pub parent_id: Option<u64>,
    pub generation: u32,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: UnknownFields,
}

impl Default for AgentRecord {
    fn default() -> Self {
        Self {
            id: None,
            age: 18.0,
            retirement_age: 65,
            retired: false,
            pension: 1000.0,
            job: "Unemployed".to_string(),
            income: 0.0,
            industry: "None".to_string(),
            health: 100.0,
            has_insurance: false,
            cost_of_living: 1500.0,
            transitioning: false,
            transition_progress: 0.0,
            home_coords: (400, 300),
            x: 400,
            y: 300,
            at_work: false,
            talents: BTreeMap::new(),
            hobbies: Vec::new(),
            education_path: None,
            career_path: None,
            education_years: None,
            education_cost: None,
            career_entry_age: None,
            career_decision_debug: None,
            parent_id: None,
            generation: 0,
            unknown: UnknownFields::new(),
        }
    }
}

/// Saved population and policy settings.
///
/// Absent keys leave the current orchestrator setting unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_population: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubi_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recession_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubi_amount: Option<f64>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: UnknownFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let snapshot: WorldSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.agents.is_empty());
        assert_eq!(snapshot.time_speed, 1.0);
        assert_eq!(snapshot.config, ConfigRecord::default());
    }

    #[test]
    fn test_partial_agent_record() {
        let record: AgentRecord =
            serde_json::from_str(r#"{"id": 7, "job": "Doctor", "income": 12000}"#).unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.job, "Doctor");
        assert_eq!(record.income, 12000.0);
        assert_eq!(record.retirement_age, 65);
        assert_eq!(record.industry, "None");
        assert!(record.unknown.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let record: AgentRecord =
            serde_json::from_str(r#"{"id": 1, "favourite_colour": "green"}"#).unwrap();
        assert_eq!(record.unknown.len(), 1);
        assert!(record.unknown.contains_key("favourite_colour"));

        let config: ConfigRecord =
            serde_json::from_str(r#"{"spawn_rate": 0.5, "gravity": 9.8}"#).unwrap();
        assert_eq!(config.spawn_rate, Some(0.5));
        assert!(config.unknown.contains_key("gravity"));
    }

    #[test]
    fn test_home_coords_serialize_as_pair() {
        let record = AgentRecord {
            home_coords: (120, 340),
            ..AgentRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["home_coords"], serde_json::json!([120, 340]));
        assert!(json.get("unknown").is_none());
    }
}
