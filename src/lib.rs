//! # Elastic Pool
//!
//! A self-scaling worker thread pool: a bounded task queue serviced by a
//! variable number of OS threads, with a background controller that grows or
//! shrinks the worker fleet based on observed load.
//!
//! Producers submit fire-and-forget tasks (a function plus an owned
//! argument payload) and block when the queue is full, giving natural
//! backpressure. Workers execute tasks off a fixed-capacity circular queue.
//! A dedicated admin controller polls queue depth and busy counts on a fixed
//! interval: it spawns workers (up to `max_workers`) while backlog outruns
//! the fleet, and hands out retirement credits (down to `min_workers`) while
//! most of the fleet sits idle.
//!
//! ## Core Properties
//!
//! - **Backpressure**: `submit` blocks while the queue is full, failing only
//!   if the pool shuts down while it waits.
//! - **Elasticity**: worker count tracks load between a configured floor and
//!   ceiling, in `default_batch` steps.
//! - **FIFO dispatch**: tasks are dequeued in submission order; completion
//!   order across workers is unspecified.
//! - **Cooperative shutdown**: workers observe shutdown only at idle-wait
//!   and dequeue boundaries, never mid-task. `destroy` optionally drains the
//!   queue first and always joins every thread before returning.
//!
//! ## Example
//!
//! ```rust,ignore
//! use elastic_pool::{Pool, PoolConfig};
//!
//! let pool = Pool::create(
//!     PoolConfig::new()
//!         .with_default_batch(4)
//!         .with_min_workers(2)
//!         .with_max_workers(10)
//!         .with_queue_capacity(64),
//! )?;
//!
//! pool.submit(|n: &mut u64| println!("crunching {n}"), 42)?;
//!
//! // Wait for the queue to empty, then join every worker.
//! pool.destroy(true);
//! ```
//!
//! Task functions receive their argument by mutable reference: ownership of
//! the payload stays with the pool, which releases it when the task's queue
//! slot is next reused, or eagerly during destroy.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core pool primitives and lifecycle operations.
pub mod core;
/// Configuration models for pools and fleets.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;

pub use crate::builders::build_pools;
pub use crate::config::{FleetConfig, PoolConfig};
pub use crate::core::{AppResult, Pool, PoolError, PoolStats};
