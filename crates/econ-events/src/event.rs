//! Event Types
//!
//! Typed entries of the orchestrator's event log. Each event renders as a
//! human-readable line via `Display`, and serializes as one tagged JSON
//! object so the log can be mirrored to a JSONL file.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::{Industry, MacroPhase, Resource};

/// Something notable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EconEvent {
    /// A company skipped production because the pool lacked a resource
    Shortage { company: String, resource: Resource },
    /// Sales fell below half of demand and the price was cut
    PriceDropped { company: String, price: f64 },
    /// Sales cleared most of demand and the price was raised
    PriceSpiked { company: String, price: f64 },
    /// A demand multiplier moved by an unusually large factor
    DemandShock { industry: Industry, multiplier: f64 },
    /// The macro cycle rotated into a new phase
    CycleAdvanced { phase: MacroPhase, inflation_rate: f64 },
    /// Units sold across all companies this tick
    MarketOutput { total: u64 },
    /// An agent was flagged bankrupt
    Bankrupt { agent_id: u64, savings: f64, debt: f64 },
    /// An agent's job was automated away
    Displaced { agent_id: u64, previous_job: String },
    /// An agent lost their job to the downturn
    LaidOff { agent_id: u64, previous_job: String },
    /// A displaced or unemployed agent chose a new career
    Retrained { agent_id: u64, job: String },
    /// An agent switched jobs without retraining
    CareerTransition { agent_id: u64, from: String, to: String },
    /// An agent reached retirement age
    Retired { agent_id: u64 },
    /// A new agent joined the population
    Birth {
        agent_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<u64>,
    },
    /// A company took an agent onto its payroll
    Hired { agent_id: u64, company: String },
    /// A company let part of its workforce go
    WorkforceCut { company: String, count: usize },
}

impl fmt::Display for EconEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EconEvent::Shortage { company, resource } => {
                write!(f, "{} shortage of {}", company, resource)
            }
            EconEvent::PriceDropped { company, price } => {
                write!(f, "{} price dropped due to oversupply ({:.2})", company, price)
            }
            EconEvent::PriceSpiked { company, price } => {
                write!(f, "{} price spiked due to high demand ({:.2})", company, price)
            }
            EconEvent::DemandShock { industry, multiplier } => {
                write!(f, "Demand shock in {}: {:.2}", industry, multiplier)
            }
            EconEvent::CycleAdvanced { phase, inflation_rate } => write!(
                f,
                "Economic cycle advanced to {} (Inflation: {:.2}%)",
                phase,
                inflation_rate * 100.0
            ),
            EconEvent::MarketOutput { total } => write!(f, "Total market output: {}", total),
            EconEvent::Bankrupt {
                agent_id,
                savings,
                debt,
            } => write!(
                f,
                "Agent {} BANKRUPT (Savings: {:.2}, Debt: {:.2})",
                agent_id, savings, debt
            ),
            EconEvent::Displaced {
                agent_id,
                previous_job,
            } => write!(f, "{} lost job to automation (Agent {})", previous_job, agent_id),
            EconEvent::LaidOff {
                agent_id,
                previous_job,
            } => write!(f, "{} lost job in downturn (Agent {})", previous_job, agent_id),
            EconEvent::Retrained { agent_id, job } => {
                write!(f, "Agent {} retrained to {}", agent_id, job)
            }
            EconEvent::CareerTransition { agent_id, from, to } => {
                write!(f, "Agent {} changed careers from {} to {}", agent_id, from, to)
            }
            EconEvent::Retired { agent_id } => write!(f, "Agent {} retired", agent_id),
            EconEvent::Birth {
                agent_id,
                parent_id: Some(parent),
            } => write!(f, "Agent {} born to Agent {}", agent_id, parent),
            EconEvent::Birth {
                agent_id,
                parent_id: None,
            } => write!(f, "Agent {} joined the population", agent_id),
            EconEvent::Hired { agent_id, company } => {
                write!(f, "{} hired Agent {}", company, agent_id)
            }
            EconEvent::WorkforceCut { company, count } => {
                write!(f, "{} laid off {} employees", company, count)
            }
        }
    }
}

/// A timestamped event-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Tick during which the event was recorded
    pub tick: u64,
    #[serde(flatten)]
    pub event: EconEvent,
}

impl LogEntry {
    pub fn new(tick: u64, event: EconEvent) -> Self {
        Self { tick, event }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] {}", self.tick, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortage_message_names_resource() {
        let entry = LogEntry::new(
            12,
            EconEvent::Shortage {
                company: "Tech".into(),
                resource: Resource::Labor,
            },
        );
        assert_eq!(entry.to_string(), "[tick 12] Tech shortage of labor");
    }

    #[test]
    fn test_cycle_message_formats_percent() {
        let event = EconEvent::CycleAdvanced {
            phase: MacroPhase::Recession,
            inflation_rate: 0.04,
        };
        assert_eq!(
            event.to_string(),
            "Economic cycle advanced to recession (Inflation: 4.00%)"
        );
    }

    #[test]
    fn test_entry_json_is_flat_and_tagged() {
        let entry = LogEntry::new(3, EconEvent::MarketOutput { total: 42 });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["tick"], 3);
        assert_eq!(json["type"], "market_output");
        assert_eq!(json["total"], 42);

        let parsed: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, entry);
    }
}
