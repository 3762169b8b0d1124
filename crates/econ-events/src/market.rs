//! Market Vocabulary
//!
//! Industries, raw resources and business-cycle phases shared by the engine,
//! the event log and the snapshot schema.
//!
//! Variants are declared in lexicographic order of their labels, so the
//! derived `Ord` gives the deterministic iteration order used by every
//! per-industry and per-resource pass.
//!
//! # Example
//!
//! ```
//! use econ_events::{Industry, MacroPhase};
//!
//! assert_eq!("Tech".parse::<Industry>().unwrap(), Industry::Tech);
//! assert_eq!(MacroPhase::Boom.next(), MacroPhase::Recession);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub label: String,
}

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.label)
    }
}

impl std::error::Error for ParseLabelError {}

/// Industry sector an agent works in or a company produces for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Industry {
    Education,
    Finance,
    Healthcare,
    Legal,
    Logistics,
    Manufacturing,
    Retail,
    Services,
    Tech,
}

impl Industry {
    pub const ALL: [Industry; 9] = [
        Industry::Education,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Legal,
        Industry::Logistics,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Services,
        Industry::Tech,
    ];

    /// Industries that run a company in the market model.
    pub const MARKET_SECTORS: [Industry; 5] = [
        Industry::Education,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Retail,
        Industry::Tech,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Industry::Education => "Education",
            Industry::Finance => "Finance",
            Industry::Healthcare => "Healthcare",
            Industry::Legal => "Legal",
            Industry::Logistics => "Logistics",
            Industry::Manufacturing => "Manufacturing",
            Industry::Retail => "Retail",
            Industry::Services => "Services",
            Industry::Tech => "Tech",
        }
    }

    /// True for sectors that sell into the consumer-goods demand pool.
    pub fn is_consumer_facing(self) -> bool {
        matches!(
            self,
            Industry::Tech | Industry::Retail | Industry::Healthcare | Industry::Education
        )
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|industry| industry.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError {
                kind: "industry",
                label: s.to_string(),
            })
    }
}

/// Raw material held in the shared resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Energy,
    Labor,
    Steel,
    Water,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Energy,
        Resource::Labor,
        Resource::Steel,
        Resource::Water,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Energy => "energy",
            Resource::Labor => "labor",
            Resource::Steel => "steel",
            Resource::Water => "water",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError {
                kind: "resource",
                label: s.to_string(),
            })
    }
}

/// Economy-wide business cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MacroPhase {
    #[default]
    Boom,
    Recession,
    Stagnation,
}

impl MacroPhase {
    /// Returns the next phase in the boom → recession → stagnation rotation.
    pub fn next(self) -> Self {
        match self {
            MacroPhase::Boom => MacroPhase::Recession,
            MacroPhase::Recession => MacroPhase::Stagnation,
            MacroPhase::Stagnation => MacroPhase::Boom,
        }
    }

    /// Annual inflation rate set when the cycle lands on this phase.
    pub fn inflation_rate(self) -> f64 {
        match self {
            MacroPhase::Boom => 0.02,
            MacroPhase::Recession => 0.04,
            MacroPhase::Stagnation => 0.01,
        }
    }
}

impl fmt::Display for MacroPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroPhase::Boom => write!(f, "boom"),
            MacroPhase::Recession => write!(f, "recession"),
            MacroPhase::Stagnation => write!(f, "stagnation"),
        }
    }
}

/// Per-company production phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompanyPhase {
    Boom,
    Bust,
    #[default]
    Neutral,
}

impl CompanyPhase {
    pub const ALL: [CompanyPhase; 3] = [CompanyPhase::Boom, CompanyPhase::Bust, CompanyPhase::Neutral];

    /// Production and price multipliers for this phase.
    pub fn factors(self) -> (f64, f64) {
        match self {
            CompanyPhase::Boom => (1.2, 1.1),
            CompanyPhase::Bust => (0.7, 0.8),
            CompanyPhase::Neutral => (1.0, 1.0),
        }
    }
}

impl fmt::Display for CompanyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanyPhase::Boom => write!(f, "boom"),
            CompanyPhase::Bust => write!(f, "bust"),
            CompanyPhase::Neutral => write!(f, "neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_industry_order_is_lexicographic() {
        let labels: Vec<&str> = Industry::ALL.iter().map(|i| i.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);

        let mut by_ord = Industry::ALL.to_vec();
        by_ord.sort();
        assert_eq!(by_ord, Industry::ALL.to_vec());
    }

    #[test]
    fn test_industry_parse() {
        assert_eq!("healthcare".parse::<Industry>().unwrap(), Industry::Healthcare);
        assert!("None".parse::<Industry>().is_err());
    }

    #[test]
    fn test_resource_labels() {
        assert_eq!(Resource::Labor.to_string(), "labor");
        assert_eq!("steel".parse::<Resource>().unwrap(), Resource::Steel);
        let json = serde_json::to_string(&Resource::Water).unwrap();
        assert_eq!(json, "\"water\"");
    }

    #[test]
    fn test_macro_rotation() {
        let mut phase = MacroPhase::Boom;
        let mut visited = Vec::new();
        for _ in 0..6 {
            phase = phase.next();
            visited.push((phase, phase.inflation_rate()));
        }
        assert_eq!(visited[0], (MacroPhase::Recession, 0.04));
        assert_eq!(visited[1], (MacroPhase::Stagnation, 0.01));
        assert_eq!(visited[2], (MacroPhase::Boom, 0.02));
        assert_eq!(visited[3..], visited[..3]);
    }

    #[test]
    fn test_company_phase_factors() {
        assert_eq!(CompanyPhase::Boom.factors(), (1.2, 1.1));
        assert_eq!(CompanyPhase::Bust.factors(), (0.7, 0.8));
        assert_eq!(CompanyPhase::Neutral.factors(), (1.0, 1.0));
    }
}
