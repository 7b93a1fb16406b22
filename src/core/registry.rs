//! Fixed-size worker slot table.
//!
//! The registry is the controller's view of the worker fleet: one slot per
//! potential worker (capacity = the configured maximum), each carrying a
//! status maintained by the occupant itself plus custody of its join handle.
//! Slot reuse keeps the pool's memory footprint bounded by the maximum
//! worker count regardless of how many times the fleet grows and shrinks.

use std::thread::JoinHandle;

use tracing::debug;

/// Occupancy of a registry slot, updated by the occupying worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotStatus {
    /// No live occupant; a respawn target for the controller.
    Empty,
    /// Occupant alive, waiting for work.
    Idle,
    /// Occupant alive, executing a task.
    Busy,
    /// Occupant alive, winding down for shutdown.
    Exiting,
}

struct WorkerSlot {
    status: SlotStatus,
    handle: Option<JoinHandle<()>>,
}

pub(crate) struct WorkerRegistry {
    slots: Vec<WorkerSlot>,
}

impl WorkerRegistry {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || WorkerSlot {
            status: SlotStatus::Empty,
            handle: None,
        });
        Self { slots }
    }

    /// Install a freshly spawned worker into a slot.
    ///
    /// A stale handle left behind by a retired occupant is discarded; its
    /// thread has already returned.
    pub(crate) fn install(&mut self, index: usize, handle: JoinHandle<()>) {
        let slot = &mut self.slots[index];
        if slot.handle.take().is_some() {
            debug!(slot = index, "discarding stale handle of retired worker");
        }
        slot.status = SlotStatus::Idle;
        slot.handle = Some(handle);
    }

    pub(crate) fn set_status(&mut self, index: usize, status: SlotStatus) {
        self.slots[index].status = status;
    }

    /// Mark a slot vacated by a retiring or dead worker, making it a
    /// respawn target again.
    pub(crate) fn retire(&mut self, index: usize) {
        self.slots[index].status = SlotStatus::Empty;
    }

    /// Index of the next respawn target, if any.
    pub(crate) fn next_empty(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.status == SlotStatus::Empty)
    }

    /// Take custody of every held join handle. Used by destroy.
    pub(crate) fn take_handles(&mut self) -> Vec<JoinHandle<()>> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.handle.take())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn status(&self, index: usize) -> SlotStatus {
        self.slots[index].status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn slots_start_empty() {
        let registry = WorkerRegistry::with_capacity(3);
        assert_eq!(registry.next_empty(), Some(0));
        for index in 0..3 {
            assert_eq!(registry.status(index), SlotStatus::Empty);
        }
    }

    #[test]
    fn install_claims_slot_and_retire_releases_it() {
        let mut registry = WorkerRegistry::with_capacity(2);
        let handle = thread::spawn(|| {});
        registry.install(0, handle);

        assert_eq!(registry.status(0), SlotStatus::Idle);
        assert_eq!(registry.next_empty(), Some(1));

        registry.retire(0);
        assert_eq!(registry.next_empty(), Some(0));

        // The stale handle is still held for joining at teardown.
        let handles = registry.take_handles();
        assert_eq!(handles.len(), 1);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn reuse_discards_stale_handle() {
        let mut registry = WorkerRegistry::with_capacity(1);
        let first = thread::spawn(|| {});
        registry.install(0, first);
        registry.retire(0);

        let second = thread::spawn(|| {});
        registry.install(0, second);
        assert_eq!(registry.status(0), SlotStatus::Idle);

        // Only the second handle remains in custody.
        assert_eq!(registry.take_handles().len(), 1);
    }

    #[test]
    fn status_transitions() {
        let mut registry = WorkerRegistry::with_capacity(1);
        let handle = thread::spawn(|| {});
        registry.install(0, handle);

        registry.set_status(0, SlotStatus::Busy);
        assert_eq!(registry.status(0), SlotStatus::Busy);
        assert_eq!(registry.next_empty(), None);

        registry.set_status(0, SlotStatus::Exiting);
        assert_eq!(registry.status(0), SlotStatus::Exiting);

        for handle in registry.take_handles() {
            handle.join().unwrap();
        }
    }
}
