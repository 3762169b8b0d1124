//! Economy Simulation Engine Library
//!
//! A tick-driven economy: agents choose careers and manage their finances
//! while one company per sector produces against a shared resource pool
//! under a rotating business cycle and adjustable policy levers.

pub mod clock;
pub mod components;
pub mod config;
pub mod economy;
pub mod events;
pub mod persistence;
pub mod projection;
pub mod setup;
pub mod systems;

pub use components::*;

pub use clock::{BirthTiming, Clock, ManualClock, SystemClock, TimeKeeper};
pub use config::{Config, ConfigError, ConfigPatch, ScenarioPreset, DEFAULT_CONFIG_PATH};
pub use economy::{CompanyStats, Economy};
pub use events::EventLog;
pub use persistence::PersistenceError;
pub use projection::{AgentView, Shape, SocioeconomicClass};
