//! Configuration models for pools and fleets.

pub mod pool;

pub use pool::{FleetConfig, PoolConfig};
