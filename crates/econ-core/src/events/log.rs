//! Event Log
//!
//! Bounded in-memory event log with an optional append-only JSONL sink.

use bevy_ecs::prelude::*;
use econ_events::{EconEvent, LogEntry};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default number of entries kept in memory.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Resource holding the most recent log entries
///
/// Oldest entries are evicted once `capacity` is reached. When a sink is
/// attached every entry is also written to it, so nothing is lost on long
/// runs.
#[derive(Resource)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    total_logged: u64,
    current_tick: u64,
    sink: Option<BufWriter<File>>,
}

impl EventLog {
    /// Create an in-memory log keeping at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_logged: 0,
            current_tick: 0,
            sink: None,
        }
    }

    /// Create a log that also appends every entry to a JSONL file
    pub fn with_sink(capacity: usize, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut log = Self::new(capacity);
        log.sink = Some(BufWriter::new(file));
        Ok(log)
    }

    /// Stamp subsequent entries with `tick`
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Append an event stamped with the current tick
    pub fn log(&mut self, event: EconEvent) {
        let entry = LogEntry::new(self.current_tick, event);
        tracing::trace!(target: "econ::events", "{}", entry);

        if let Some(writer) = self.sink.as_mut() {
            let written = serde_json::to_string(&entry)
                .map_err(std::io::Error::from)
                .and_then(|json| writeln!(writer, "{}", json));
            if let Err(e) = written {
                tracing::warn!("Event sink failed, continuing in memory only: {}", e);
                self.sink = None;
            }
        }

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.total_logged += 1;
    }

    /// Entries currently held, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The most recent `n` entries, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev().take(n)
    }

    /// Entries rendered as human-readable lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries ever appended, including evicted ones
    pub fn total_logged(&self) -> u64 {
        self.total_logged
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Flush the sink to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.sink {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event log: {}", e);
        }
    }
}
