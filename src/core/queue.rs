//! Fixed-capacity circular task queue with deferred payload release.
//!
//! The queue lives behind the pool's state lock and performs no locking of
//! its own. Each slot keeps, besides a pending task, the argument payload of
//! the task that last executed out of it; that payload is dropped when the
//! slot is next written, or eagerly when the pool drains during destroy.

use crate::core::task::Task;

struct Slot<P> {
    task: Option<Task<P>>,
    retired: Option<P>,
}

impl<P> Default for Slot<P> {
    fn default() -> Self {
        Self {
            task: None,
            retired: None,
        }
    }
}

pub(crate) struct TaskQueue<P> {
    slots: Box<[Slot<P>]>,
    front: usize,
    rear: usize,
    len: usize,
}

impl<P> TaskQueue<P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::default);
        Self {
            slots: slots.into_boxed_slice(),
            front: 0,
            rear: 0,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Store a task at the rear slot and advance it.
    ///
    /// The slot's retired payload, if any, is dropped before the overwrite.
    /// Caller must have verified the queue is not full.
    pub(crate) fn enqueue(&mut self, task: Task<P>) {
        debug_assert!(!self.is_full());
        let slot = &mut self.slots[self.rear];
        if let Some(stale) = slot.retired.take() {
            drop(stale);
        }
        slot.task = Some(task);
        self.rear = (self.rear + 1) % self.slots.len();
        self.len += 1;
    }

    /// Remove the task at the front slot, returning it together with the
    /// index of the slot it occupied so the executed payload can be parked
    /// back there afterwards.
    pub(crate) fn dequeue(&mut self) -> Option<(Task<P>, usize)> {
        if self.len == 0 {
            return None;
        }
        let index = self.front;
        let task = self.slots[index].task.take()?;
        self.front = (self.front + 1) % self.slots.len();
        self.len -= 1;
        Some((task, index))
    }

    /// Park an executed task's argument in the slot it was dequeued from.
    /// It stays there until the slot is next written, or until drain.
    pub(crate) fn park_retired(&mut self, index: usize, payload: P) {
        self.slots[index].retired = Some(payload);
    }

    /// Drop every resident task and retired payload, returning how many
    /// values were released. Used by destroy.
    pub(crate) fn drain_payloads(&mut self) -> usize {
        let mut dropped = 0;
        for slot in self.slots.iter_mut() {
            if slot.task.take().is_some() {
                dropped += 1;
            }
            if slot.retired.take().is_some() {
                dropped += 1;
            }
        }
        self.front = 0;
        self.rear = 0;
        self.len = 0;
        dropped
    }
}
