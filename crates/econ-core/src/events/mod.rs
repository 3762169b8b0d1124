//! Event logging for the orchestrator.

pub mod log;

pub use log::{EventLog, DEFAULT_LOG_CAPACITY};
