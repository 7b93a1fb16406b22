//! Worker lifecycle counters and observable pool statistics.

/// Lifecycle counters guarded by the pool's state lock.
///
/// The busy-worker count is deliberately absent: it lives behind the pool's
/// dedicated busy-count lock so that execution bookkeeping never contends
/// with enqueue/dequeue traffic.
#[derive(Debug)]
pub(crate) struct WorkerCounters {
    /// Workers currently counted alive, whether idle, busy, or about to exit.
    pub live: u32,
    /// Floor for `live`.
    pub min: u32,
    /// Ceiling for `live`; also the registry capacity.
    pub max: u32,
    /// Workers spawned or retirement-credited per controller pass.
    pub default_batch: u32,
    /// Pending retirement authorizations, consumed at most one per idle wake.
    pub exit_credits: u32,
}

impl WorkerCounters {
    pub(crate) fn new(default_batch: u32, min: u32, max: u32) -> Self {
        Self {
            live: min,
            min,
            max,
            default_batch,
            exit_credits: 0,
        }
    }
}

/// Point-in-time snapshot of pool utilization.
///
/// Produced by [`Pool::stats`](crate::core::Pool::stats); the two pool locks
/// are taken one after the other, never together, so a snapshot may straddle
/// a counter update. Treat it as an observation, not a transaction.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Workers currently alive.
    pub live: u32,
    /// Workers currently executing a task.
    pub busy: u32,
    /// Configured worker floor.
    pub min: u32,
    /// Configured worker ceiling.
    pub max: u32,
    /// Tasks waiting in the queue.
    pub queued: usize,
    /// Fixed queue capacity.
    pub queue_capacity: usize,
    /// Outstanding retirement credits.
    pub exit_credits: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_floor() {
        let counters = WorkerCounters::new(4, 2, 10);
        assert_eq!(counters.live, 2);
        assert_eq!(counters.min, 2);
        assert_eq!(counters.max, 10);
        assert_eq!(counters.default_batch, 4);
        assert_eq!(counters.exit_credits, 0);
    }

    #[test]
    fn stats_default_is_zeroed() {
        let stats = PoolStats::default();
        assert_eq!(stats.live, 0);
        assert_eq!(stats.busy, 0);
        assert_eq!(stats.queued, 0);
    }
}
