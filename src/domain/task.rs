//! Cancellable, deliver-at-most-once asynchronous task primitives.
//!
//! Every loader in the crate reports its result through a [`Completion`] and
//! hands back a [`LoadTask`] the caller may cancel. [`CompletionSlot`] is the
//! shared guard between the two: the completion lives in an `Option` that is
//! taken exactly once, either by delivery or by cancellation.

use std::sync::Arc;

use parking_lot::Mutex;

/// Callback receiving the single result of an asynchronous operation.
pub type Completion<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

/// Handle to one in-flight load.
pub trait LoadTask: Send + Sync {
    /// Cancels the load. Idempotent, and a no-op once the load has completed.
    fn cancel(&self);
}

/// Owned completion that is consumed at most once.
pub struct CompletionSlot<T, E> {
    completion: Arc<Mutex<Option<Completion<T, E>>>>,
}

impl<T, E> CompletionSlot<T, E> {
    /// Wraps a completion.
    #[must_use]
    pub fn new(completion: Completion<T, E>) -> Self {
        Self {
            completion: Arc::new(Mutex::new(Some(completion))),
        }
    }

    /// Delivers `result` if the slot still holds its completion.
    ///
    /// Returns `false` when the slot was already consumed or cancelled.
    pub fn complete(&self, result: Result<T, E>) -> bool {
        let completion = self.completion.lock().take();
        match completion {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }

    /// Drops the completion so no later delivery can reach it.
    pub fn cancel(&self) {
        self.completion.lock().take();
    }

    /// Returns true while the completion has neither fired nor been cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.completion.lock().is_some()
    }
}

impl<T, E> Clone for CompletionSlot<T, E> {
    fn clone(&self) -> Self {
        Self {
            completion: Arc::clone(&self.completion),
        }
    }
}

impl<T, E> std::fmt::Debug for CompletionSlot<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSlot")
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl<T, E> LoadTask for CompletionSlot<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn cancel(&self) {
        Self::cancel(self);
    }
}

/// Task whose cancellation first clears its own completion, then cancels the
/// task it wraps.
pub struct ForwardingTask<T, E> {
    slot: CompletionSlot<T, E>,
    inner: Mutex<Option<Box<dyn LoadTask>>>,
}

impl<T, E> ForwardingTask<T, E> {
    /// Creates a task guarding `slot` with no underlying task yet.
    #[must_use]
    pub fn new(slot: CompletionSlot<T, E>) -> Self {
        Self {
            slot,
            inner: Mutex::new(None),
        }
    }

    /// Attaches the underlying task. If the slot has already been cancelled the
    /// underlying task is cancelled right away.
    pub fn attach(&self, task: Box<dyn LoadTask>) {
        let mut inner = self.inner.lock();
        if self.slot.is_pending() {
            *inner = Some(task);
            return;
        }
        drop(inner);
        task.cancel();
    }
}

impl<T, E> LoadTask for ForwardingTask<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn cancel(&self) {
        self.slot.cancel();
        let inner = self.inner.lock().take();
        if let Some(inner) = inner {
            inner.cancel();
        }
    }
}

/// Task that has nothing left to cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletedTask;

impl LoadTask for CompletedTask {
    fn cancel(&self) {}
}
