//! Configuration System
//!
//! Loads tuning parameters from econ.toml so runs can be adjusted without
//! recompiling, and defines the partial patches that change policy and
//! population settings while a run is live.

use econ_events::{ConfigRecord, Industry, MacroPhase, Resource, UnknownFields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::clock::BirthTiming;
use crate::components::pool::{ResourcePool, DEFAULT_RESOURCE_QUANTITY};
use crate::components::world::{BirthControl, LifecycleRates, MacroCycle, Policy};
use crate::events::DEFAULT_LOG_CAPACITY;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "econ.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub population: PopulationConfig,
    pub policy: PolicyConfig,
    pub macro_cycle: MacroCycleConfig,
    pub lifecycle: LifecycleConfig,
    pub resources: ResourcesConfig,
}

/// Run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub ticks: u64,
    /// Random agents created before the first tick
    pub initial_population: usize,
    /// Also add one agent per career of every education path
    pub seed_careers: bool,
    /// Ticks between summary lines in the binary
    pub report_interval: u64,
    pub event_log_capacity: usize,
    /// Optional JSONL file mirroring every event-log entry
    pub event_log_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
            initial_population: 100,
            seed_careers: false,
            report_interval: 100,
            event_log_capacity: DEFAULT_LOG_CAPACITY,
            event_log_path: None,
        }
    }
}

/// How birth pacing reads elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthTimingMode {
    #[default]
    WallClock,
    Simulated,
}

/// Birth pacing and the population cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub spawn_enabled: bool,
    /// Births per second
    pub spawn_rate: f64,
    pub max_population: usize,
    pub birth_timing: BirthTimingMode,
    /// Seconds each tick counts for under simulated timing
    pub seconds_per_tick: f64,
}

impl PopulationConfig {
    pub fn birth_control(&self) -> BirthControl {
        BirthControl {
            spawn_enabled: self.spawn_enabled,
            spawn_rate: self.spawn_rate,
            max_population: self.max_population,
            last_birth: 0.0,
        }
    }

    pub fn birth_timing(&self) -> BirthTiming {
        match self.birth_timing {
            BirthTimingMode::WallClock => BirthTiming::WallClock,
            BirthTimingMode::Simulated => BirthTiming::SimulatedTicks {
                seconds_per_tick: self.seconds_per_tick,
            },
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            spawn_enabled: true,
            spawn_rate: 0.1,
            max_population: 1000,
            birth_timing: BirthTimingMode::WallClock,
            seconds_per_tick: 1.0 / 60.0,
        }
    }
}

/// Policy levers at the start of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub ubi_enabled: bool,
    pub ubi_amount: f64,
    pub automation_enabled: bool,
    pub recession_enabled: bool,
    pub corporate_tax_rate: f64,
    pub price_controls_enabled: bool,
    pub price_ceiling: f64,
    /// Production stimulus keyed by industry name
    pub stimulus_by_industry: BTreeMap<String, f64>,
}

impl PolicyConfig {
    /// Convert to the policy resource. Unknown industry names are skipped
    /// with a warning.
    pub fn to_policy(&self) -> Policy {
        Policy {
            ubi_enabled: self.ubi_enabled,
            ubi_amount: self.ubi_amount,
            automation_enabled: self.automation_enabled,
            recession_enabled: self.recession_enabled,
            corporate_tax_rate: self.corporate_tax_rate,
            price_controls_enabled: self.price_controls_enabled,
            price_ceiling: self.price_ceiling,
            stimulus_by_industry: parse_stimulus(&self.stimulus_by_industry),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let policy = Policy::default();
        Self {
            ubi_enabled: policy.ubi_enabled,
            ubi_amount: policy.ubi_amount,
            automation_enabled: policy.automation_enabled,
            recession_enabled: policy.recession_enabled,
            corporate_tax_rate: policy.corporate_tax_rate,
            price_controls_enabled: policy.price_controls_enabled,
            price_ceiling: policy.price_ceiling,
            stimulus_by_industry: policy
                .stimulus_by_industry
                .iter()
                .map(|(industry, &stimulus)| (industry.to_string(), stimulus))
                .collect(),
        }
    }
}

fn parse_stimulus(raw: &BTreeMap<String, f64>) -> BTreeMap<Industry, f64> {
    raw.iter()
        .filter_map(|(name, &stimulus)| match name.parse::<Industry>() {
            Ok(industry) => Some((industry, stimulus)),
            Err(e) => {
                tracing::warn!("Ignoring stimulus entry: {}", e);
                None
            }
        })
        .collect()
}

/// Business cycle at the start of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroCycleConfig {
    /// Timer length of one phase (the timer gains 0.01 per tick at speed 1)
    pub cycle_length: f64,
    pub inflation_rate: f64,
    pub phase: MacroPhase,
}

impl MacroCycleConfig {
    pub fn macro_cycle(&self) -> MacroCycle {
        MacroCycle {
            phase: self.phase,
            inflation_rate: self.inflation_rate,
            timer: 0.0,
            length: self.cycle_length,
        }
    }
}

impl Default for MacroCycleConfig {
    fn default() -> Self {
        let cycle = MacroCycle::default();
        Self {
            cycle_length: cycle.length,
            inflation_rate: cycle.inflation_rate,
            phase: cycle.phase,
        }
    }
}

/// Per-tick life-cycle rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub aging_rate: f64,
    pub health_decay: f64,
    pub insured_recovery: f64,
    pub transition_rate: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        let rates = LifecycleRates::default();
        Self {
            aging_rate: rates.aging_rate,
            health_decay: rates.health_decay,
            insured_recovery: rates.insured_recovery,
            transition_rate: rates.transition_rate,
        }
    }
}

impl From<&LifecycleConfig> for LifecycleRates {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            aging_rate: config.aging_rate,
            health_decay: config.health_decay,
            insured_recovery: config.insured_recovery,
            transition_rate: config.transition_rate,
        }
    }
}

/// Starting quantities of the shared pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub energy: u64,
    pub labor: u64,
    pub steel: u64,
    pub water: u64,
}

impl ResourcesConfig {
    pub fn pool(&self) -> ResourcePool {
        ResourcePool::from_quantities([
            (Resource::Energy, self.energy),
            (Resource::Labor, self.labor),
            (Resource::Steel, self.steel),
            (Resource::Water, self.water),
        ])
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            energy: DEFAULT_RESOURCE_QUANTITY,
            labor: DEFAULT_RESOURCE_QUANTITY,
            steel: DEFAULT_RESOURCE_QUANTITY,
            water: DEFAULT_RESOURCE_QUANTITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A partial settings change applied to a running economy.
///
/// Absent fields leave the current value alone. Keys that name no setting
/// are collected in `unknown` and reported rather than applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_population: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubi_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubi_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recession_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporate_tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_controls_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_ceiling: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stimulus_by_industry: Option<BTreeMap<String, f64>>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: UnknownFields,
}

impl ConfigPatch {
    /// Parse a patch from an arbitrary JSON object
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Stimulus entries with known industry names
    pub fn stimulus(&self) -> Option<BTreeMap<Industry, f64>> {
        self.stimulus_by_industry.as_ref().map(parse_stimulus)
    }

    /// Apply the policy fields of this patch
    pub fn apply_to_policy(&self, policy: &mut Policy) {
        if let Some(v) = self.ubi_enabled {
            policy.ubi_enabled = v;
        }
        if let Some(v) = self.ubi_amount {
            policy.ubi_amount = v;
        }
        if let Some(v) = self.automation_enabled {
            policy.automation_enabled = v;
        }
        if let Some(v) = self.recession_enabled {
            policy.recession_enabled = v;
        }
        if let Some(v) = self.corporate_tax_rate {
            policy.corporate_tax_rate = v;
        }
        if let Some(v) = self.price_controls_enabled {
            policy.price_controls_enabled = v;
        }
        if let Some(v) = self.price_ceiling {
            policy.price_ceiling = v;
        }
        if let Some(stimulus) = self.stimulus() {
            policy.stimulus_by_industry.extend(stimulus);
        }
    }

    /// Apply the population fields of this patch
    pub fn apply_to_births(&self, births: &mut BirthControl) {
        if let Some(v) = self.spawn_enabled {
            births.spawn_enabled = v;
        }
        if let Some(v) = self.spawn_rate {
            births.spawn_rate = v;
        }
        if let Some(v) = self.max_population {
            births.max_population = v;
        }
    }
}

impl From<ConfigRecord> for ConfigPatch {
    fn from(record: ConfigRecord) -> Self {
        Self {
            spawn_rate: record.spawn_rate,
            max_population: record.max_population,
            ubi_enabled: record.ubi_enabled,
            ubi_amount: record.ubi_amount,
            automation_enabled: record.automation_enabled,
            recession_enabled: record.recession_enabled,
            unknown: record.unknown,
            ..Self::default()
        }
    }
}

/// Named starting configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPreset {
    Normal,
    Recession2008,
    HighAutomation,
    PostUbi,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 4] = [
        ScenarioPreset::Normal,
        ScenarioPreset::Recession2008,
        ScenarioPreset::HighAutomation,
        ScenarioPreset::PostUbi,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioPreset::Normal => "Normal",
            ScenarioPreset::Recession2008 => "2008 Recession",
            ScenarioPreset::HighAutomation => "High Automation",
            ScenarioPreset::PostUbi => "Post-UBI",
        }
    }

    /// The settings this preset applies
    pub fn patch(self) -> ConfigPatch {
        let (spawn_rate, max_population, ubi, automation, recession, ubi_amount) = match self {
            ScenarioPreset::Normal => (0.5, 200, false, false, false, 600.0),
            ScenarioPreset::Recession2008 => (0.3, 180, false, false, true, 600.0),
            ScenarioPreset::HighAutomation => (0.4, 220, false, true, false, 600.0),
            ScenarioPreset::PostUbi => (0.6, 250, true, true, false, 1200.0),
        };
        ConfigPatch {
            spawn_rate: Some(spawn_rate),
            max_population: Some(max_population),
            ubi_enabled: Some(ubi),
            automation_enabled: Some(automation),
            recession_enabled: Some(recession),
            ubi_amount: Some(ubi_amount),
            ..ConfigPatch::default()
        }
    }
}

impl fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioPreset {
    type Err = String;

    /// Accepts the display name or a short form (`normal`, `recession`,
    /// `automation`, `ubi`), ignoring case, spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "normal" => Ok(ScenarioPreset::Normal),
            "2008recession" | "recession2008" | "recession" => Ok(ScenarioPreset::Recession2008),
            "highautomation" | "automation" => Ok(ScenarioPreset::HighAutomation),
            "postubi" | "ubi" => Ok(ScenarioPreset::PostUbi),
            _ => Err(format!("unknown scenario '{}'", s)),
        }
    }
}
