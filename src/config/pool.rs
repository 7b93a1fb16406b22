//! Pool and fleet configuration structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const fn default_admin_interval_ms() -> u64 {
    50
}

/// Configuration for a single self-scaling pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Workers spawned or retirement-credited per controller pass. Zero
    /// selects the built-in default batch.
    pub default_batch: u32,
    /// Worker floor; the pool starts with this many workers.
    pub min_workers: u32,
    /// Worker ceiling; also the registry capacity.
    pub max_workers: u32,
    /// Fixed task queue capacity.
    pub queue_capacity: usize,
    /// Controller poll interval in milliseconds.
    #[serde(default = "default_admin_interval_ms")]
    pub admin_interval_ms: u64,
    /// Stack size for worker threads; `None` uses the platform default.
    #[serde(default)]
    pub thread_stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let cpus = num_cpus::get() as u32;
        Self {
            default_batch: cpus,
            min_workers: cpus,
            max_workers: cpus * 2,
            queue_capacity: 256,
            admin_interval_ms: default_admin_interval_ms(),
            thread_stack_size: None,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with defaults sized from the host CPU count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the growth/shrink batch size.
    #[must_use]
    pub const fn with_default_batch(mut self, default_batch: u32) -> Self {
        self.default_batch = default_batch;
        self
    }

    /// Set the worker floor.
    #[must_use]
    pub const fn with_min_workers(mut self, min_workers: u32) -> Self {
        self.min_workers = min_workers;
        self
    }

    /// Set the worker ceiling.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: u32) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the task queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the controller poll interval in milliseconds.
    #[must_use]
    pub const fn with_admin_interval_ms(mut self, admin_interval_ms: u64) -> Self {
        self.admin_interval_ms = admin_interval_ms;
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.min_workers > self.max_workers {
            return Err("min_workers must not exceed max_workers".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.admin_interval_ms == 0 {
            return Err("admin_interval_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration mapping pool names to their settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
}

impl FleetConfig {
    /// Validate all pools and ensure at least one exists.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending pool and field.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse fleet configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
