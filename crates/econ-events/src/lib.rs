//! Shared event types and serialization for the economy simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod market;
pub mod snapshot;

// Re-export market vocabulary
pub use market::{CompanyPhase, Industry, MacroPhase, ParseLabelError, Resource};

// Re-export event types
pub use event::{EconEvent, LogEntry};

// Re-export snapshot types
pub use snapshot::{AgentRecord, ConfigRecord, UnknownFields, WorldSnapshot, SNAPSHOT_VERSION};
