//! Pool aggregate: lifecycle operations, the worker loop, and the
//! autoscaling controller.
//!
//! Three kinds of thread meet here. Producers call [`Pool::submit`] and block
//! while the queue is full. Workers loop between an idle wait on the
//! `not_empty` condition and task execution. One admin controller polls the
//! counters and queue depth on a fixed interval, spawning workers into empty
//! registry slots when backlog outruns the fleet and handing out exit
//! credits when the fleet idles.
//!
//! Locking discipline: the state lock guards the queue, the counters, and
//! the registry; the busy lock guards only the busy-worker count. No thread
//! ever holds both at once.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::core::counters::{PoolStats, WorkerCounters};
use crate::core::error::PoolError;
use crate::core::queue::TaskQueue;
use crate::core::registry::{SlotStatus, WorkerRegistry};
use crate::core::task::Task;

/// Batch size substituted when the configured `default_batch` is zero.
const DEFAULT_BATCH: u32 = 100;

/// Interval between queue-empty re-checks while destroy drains. The dequeue
/// path wakes a single `not_full` waiter, so a blocked producer can consume
/// the signal the drainer needed; the timed wait makes that harmless.
const DRAIN_RECHECK: Duration = Duration::from_millis(20);

/// Everything guarded by the state lock.
struct PoolState<P> {
    queue: TaskQueue<P>,
    counters: WorkerCounters,
    registry: WorkerRegistry,
}

/// Structure shared by producers, workers, and the controller.
struct PoolShared<P> {
    state: Mutex<PoolState<P>>,
    /// Busy-worker count behind its own lock so execution bookkeeping never
    /// contends with enqueue/dequeue traffic on the state lock.
    busy: Mutex<u32>,
    /// Signaled once per enqueue, `default_batch` times per shrink pass, and
    /// broadcast at shutdown. Paired with the state lock.
    not_empty: Condvar,
    /// Signaled once per dequeue and broadcast at shutdown. Paired with the
    /// state lock.
    not_full: Condvar,
    shutdown: AtomicBool,
    admin_interval: Duration,
    thread_stack_size: Option<usize>,
}

/// A self-scaling worker pool.
///
/// Producers submit fire-and-forget tasks; a bounded circular queue applies
/// backpressure when saturated, and a background controller grows the worker
/// fleet toward `max_workers` under backlog and shrinks it toward
/// `min_workers` when mostly idle.
///
/// The pool is `Sync`: share it across producer threads behind an `Arc` or a
/// reference. Call [`Pool::destroy`] for a fully joined teardown; merely
/// dropping the pool signals shutdown but detaches its threads.
pub struct Pool<P: Send + 'static> {
    shared: Arc<PoolShared<P>>,
    admin: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Send + 'static> std::fmt::Debug for Pool<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("shutdown", &self.shared.shutdown.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<P: Send + 'static> Pool<P> {
    /// Create a pool: validate the configuration, allocate the queue and
    /// registry, and spawn `min_workers` workers plus the controller.
    ///
    /// A `default_batch` of zero selects the built-in default batch.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if validation fails, or
    /// [`PoolError::Spawn`] if any thread cannot be spawned. On spawn
    /// failure every thread spawned so far is shut down and joined before
    /// the error is returned; no partial pool reaches the caller.
    pub fn create(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let batch = if config.default_batch == 0 {
            DEFAULT_BATCH
        } else {
            config.default_batch
        };

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: TaskQueue::with_capacity(config.queue_capacity),
                counters: WorkerCounters::new(batch, config.min_workers, config.max_workers),
                registry: WorkerRegistry::with_capacity(config.max_workers as usize),
            }),
            busy: Mutex::new(0),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            shutdown: AtomicBool::new(false),
            admin_interval: Duration::from_millis(config.admin_interval_ms),
            thread_stack_size: config.thread_stack_size,
        });

        for slot in 0..config.min_workers as usize {
            match spawn_worker(&shared, slot) {
                Ok(handle) => shared.state.lock().registry.install(slot, handle),
                Err(err) => {
                    error!(slot, error = %err, "worker spawn failed during create");
                    Self::unwind(&shared);
                    return Err(PoolError::Spawn(err));
                }
            }
        }

        let admin = match spawn_admin(&shared) {
            Ok(handle) => handle,
            Err(err) => {
                error!(error = %err, "controller spawn failed during create");
                Self::unwind(&shared);
                return Err(PoolError::Spawn(err));
            }
        };

        info!(
            min = config.min_workers,
            max = config.max_workers,
            queue_capacity = config.queue_capacity,
            default_batch = batch,
            "pool created"
        );

        Ok(Self {
            shared,
            admin: Mutex::new(Some(admin)),
        })
    }

    /// Tear down a half-built pool after a create-time spawn failure.
    fn unwind(shared: &Arc<PoolShared<P>>) {
        shared.shutdown.store(true, Ordering::Release);
        // Taking the state lock orders the flag store against every waiter's
        // predicate check: any worker that saw shutdown unset has already
        // registered on the condvar and cannot miss the broadcast.
        drop(shared.state.lock());
        shared.not_empty.notify_all();
        let handles = shared.state.lock().registry.take_handles();
        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Submit a task for execution.
    ///
    /// Blocks while the queue is full. On success, ownership of `argument`
    /// has passed to the pool; the payload is released when its queue slot
    /// is next reused, or during destroy.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Shutdown`] if the pool is already shut down, or
    /// becomes shut down while this call is blocked on a full queue.
    pub fn submit<F>(&self, function: F, argument: P) -> Result<(), PoolError>
    where
        F: FnOnce(&mut P) + Send + 'static,
    {
        let task = Task::new(function, argument);

        let mut state = self.shared.state.lock();
        while state.queue.is_full() && !self.shared.shutdown.load(Ordering::Acquire) {
            self.shared.not_full.wait(&mut state);
        }
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::Shutdown);
        }

        state.queue.enqueue(task);
        debug!(queued = state.queue.len(), "task enqueued");
        drop(state);

        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Snapshot current utilization.
    ///
    /// The busy lock and the state lock are taken one after the other, never
    /// together, so the snapshot may straddle a counter update.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let busy = *self.shared.busy.lock();
        let state = self.shared.state.lock();
        PoolStats {
            live: state.counters.live,
            busy,
            min: state.counters.min,
            max: state.counters.max,
            queued: state.queue.len(),
            queue_capacity: state.queue.capacity(),
            exit_credits: state.counters.exit_credits,
        }
    }

    /// Shut the pool down and join every thread it owns.
    ///
    /// With `drain` set, blocks until the queue is empty before initiating
    /// shutdown, so every queued task executes. Without it, shutdown is
    /// immediate and still-queued tasks are discarded, their argument
    /// payloads released unexecuted.
    ///
    /// Idempotent: concurrent callers race on the shutdown flag and the
    /// losers return immediately while the winner performs the teardown.
    pub fn destroy(&self, drain: bool) {
        if drain {
            let mut state = self.shared.state.lock();
            while !state.queue.is_empty() && !self.shared.shutdown.load(Ordering::Acquire) {
                let _ = self.shared.not_full.wait_for(&mut state, DRAIN_RECHECK);
            }
        }

        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("destroying pool");
        // Taking the state lock orders the flag store against every waiter's
        // predicate check: any worker or producer that saw shutdown unset
        // has already registered on its condvar and cannot miss the
        // broadcasts below.
        drop(self.shared.state.lock());
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        if let Some(admin) = self.admin.lock().take() {
            if admin.join().is_err() {
                warn!("controller thread panicked");
            }
        }

        let handles = self.shared.state.lock().registry.take_handles();
        let worker_count = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }

        let released = self.shared.state.lock().queue.drain_payloads();
        if released > 0 {
            debug!(released, "dropped task payloads still resident in the queue");
        }
        info!(workers = worker_count, "pool destroyed");
    }
}

impl<P: Send + 'static> Drop for Pool<P> {
    /// Signals shutdown without joining, detaching any threads still
    /// running. Call [`Pool::destroy`] for a fully joined teardown.
    fn drop(&mut self) {
        if !self.shared.shutdown.swap(true, Ordering::AcqRel) {
            drop(self.shared.state.lock());
            self.shared.not_empty.notify_all();
            self.shared.not_full.notify_all();
            debug!("pool dropped without destroy; threads detached");
        }
    }
}

/// Brackets task execution: increments the busy count on arm, decrements it
/// on drop. If the task panics out of the worker, the drop path also records
/// the worker's death so the controller can refill the slot on a later pass.
struct ExecGuard<'a, P: Send + 'static> {
    shared: &'a PoolShared<P>,
    slot: usize,
    completed: bool,
}

impl<'a, P: Send + 'static> ExecGuard<'a, P> {
    fn arm(shared: &'a PoolShared<P>, slot: usize) -> Self {
        *shared.busy.lock() += 1;
        Self {
            shared,
            slot,
            completed: false,
        }
    }
}

impl<P: Send + 'static> Drop for ExecGuard<'_, P> {
    fn drop(&mut self) {
        *self.shared.busy.lock() -= 1;
        if !self.completed {
            let mut state = self.shared.state.lock();
            state.counters.live = state.counters.live.saturating_sub(1);
            state.registry.retire(self.slot);
            error!(slot = self.slot, "task panicked; worker terminating");
        }
    }
}

fn spawn_worker<P: Send + 'static>(
    shared: &Arc<PoolShared<P>>,
    slot: usize,
) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(format!("ep-worker-{slot}"));
    if let Some(stack) = shared.thread_stack_size {
        builder = builder.stack_size(stack);
    }
    let shared = Arc::clone(shared);
    builder.spawn(move || worker_loop(&shared, slot))
}

fn worker_loop<P: Send + 'static>(shared: &PoolShared<P>, slot: usize) {
    debug!(slot, "worker started");
    loop {
        let mut state = shared.state.lock();

        while state.queue.is_empty() && !shared.shutdown.load(Ordering::Acquire) {
            shared.not_empty.wait(&mut state);

            // Retirement check runs on every wake, before the queue is
            // consulted: a wake that announced work can still consume a
            // pending credit.
            if state.counters.exit_credits > 0 {
                state.counters.exit_credits -= 1;
                if state.counters.live > state.counters.min {
                    state.counters.live -= 1;
                    state.registry.retire(slot);
                    debug!(slot, live = state.counters.live, "worker retiring");
                    return;
                }
                // Credit spent without retiring anyone; keep waiting.
            }
        }

        if shared.shutdown.load(Ordering::Acquire) {
            state.registry.set_status(slot, SlotStatus::Exiting);
            debug!(slot, "worker observed shutdown");
            return;
        }

        let Some((task, origin)) = state.queue.dequeue() else {
            continue;
        };
        state.registry.set_status(slot, SlotStatus::Busy);
        drop(state);
        shared.not_full.notify_one();

        let mut guard = ExecGuard::arm(shared, slot);
        let payload = task.run();
        guard.completed = true;
        drop(guard);

        let mut state = shared.state.lock();
        state.queue.park_retired(origin, payload);
        state.registry.set_status(slot, SlotStatus::Idle);
    }
}

fn spawn_admin<P: Send + 'static>(shared: &Arc<PoolShared<P>>) -> io::Result<JoinHandle<()>> {
    let shared = Arc::clone(shared);
    thread::Builder::new()
        .name("ep-admin".into())
        .spawn(move || admin_loop(&shared))
}

/// Controller loop: one growth check and one shrink check per iteration,
/// separated by a bounded sleep.
fn admin_loop<P: Send + 'static>(shared: &Arc<PoolShared<P>>) {
    debug!("controller started");
    while !shared.shutdown.load(Ordering::Acquire) {
        let (backlog, live, min, max, batch) = {
            let state = shared.state.lock();
            (
                state.queue.len(),
                state.counters.live,
                state.counters.min,
                state.counters.max,
                state.counters.default_batch,
            )
        };
        let busy = *shared.busy.lock();

        if (live as usize) < backlog && live < max {
            grow(shared, batch);
        }

        if busy * 2 < live && live > min {
            info!(busy, live, min, batch, "shrinking worker fleet");
            {
                let mut state = shared.state.lock();
                state.counters.exit_credits = batch;
            }
            // Each signal wakes at most one idle worker, which consumes one
            // credit. A signal landing on a worker that just picked up a
            // task wastes a credit that lingers until a future idle wake.
            for _ in 0..batch {
                shared.not_empty.notify_one();
            }
        }

        thread::sleep(shared.admin_interval);
    }
    debug!("controller exiting");
}

/// Spawn workers into empty registry slots, up to `batch` of them and never
/// past the configured maximum. A spawn failure aborts the pass early;
/// partial growth is retained and the next pass retries.
fn grow<P: Send + 'static>(shared: &Arc<PoolShared<P>>, batch: u32) {
    let mut state = shared.state.lock();
    let mut added = 0u32;
    while added < batch && state.counters.live < state.counters.max {
        let Some(slot) = state.registry.next_empty() else {
            break;
        };
        match spawn_worker(shared, slot) {
            Ok(handle) => {
                state.registry.install(slot, handle);
                state.counters.live += 1;
                added += 1;
            }
            Err(err) => {
                error!(slot, error = %err, "worker spawn failed during growth");
                break;
            }
        }
    }
    if added > 0 {
        info!(added, live = state.counters.live, "grew worker fleet");
    }
}
