//! ECS Components
//!
//! Agent components, the career vocabulary, companies, the resource pool
//! and economy-wide resources.

pub mod agent;
pub mod career;
pub mod company;
pub mod pool;
pub mod world;

pub use agent::*;
pub use career::*;
pub use company::*;
pub use pool::*;
pub use world::*;
