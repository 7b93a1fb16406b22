//! Task unit: a boxed function plus the owned argument it runs against.

/// Callable part of a task.
///
/// The function receives the argument by mutable reference rather than by
/// value: after execution the payload remains owned by the pool and is
/// released when its queue slot is next reused, or during destroy.
pub type TaskFn<P> = Box<dyn FnOnce(&mut P) + Send + 'static>;

/// A fire-and-forget unit of work submitted to a pool.
pub struct Task<P> {
    function: TaskFn<P>,
    argument: P,
}

impl<P> Task<P> {
    /// Package a function and its argument into a task.
    ///
    /// Ownership of `argument` passes to the task, and from there to the
    /// pool at submission.
    pub fn new<F>(function: F, argument: P) -> Self
    where
        F: FnOnce(&mut P) + Send + 'static,
    {
        Self {
            function: Box::new(function),
            argument,
        }
    }

    /// Run the task and hand the argument back for parking in its slot.
    pub(crate) fn run(self) -> P {
        let Self {
            function,
            mut argument,
        } = self;
        function(&mut argument);
        argument
    }
}
