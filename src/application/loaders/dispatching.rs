//! Completion redispatch onto an owning execution context.
//!
//! Loaders complete on whatever thread their I/O finished on. Wrapping them in
//! [`Dispatching`] hands every completion to a [`Dispatcher`] instead, typically
//! the event loop that owns the presentation.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::entities::{PageRequest, Pet};
use crate::domain::errors::{PetListError, PhotoError};
use crate::domain::ports::{PetLoader, PhotoCache, PhotoLoader};
use crate::domain::task::{Completion, CompletionSlot, ForwardingTask, LoadTask};

/// Unit of work handed to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Execution context that runs jobs.
pub trait Dispatcher: Send + Sync + 'static {
    /// Schedules `job`.
    fn dispatch(&self, job: Job);
}

/// Runs jobs on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl Dispatcher for ImmediateDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Sends jobs to the receiver returned by [`ChannelDispatcher::new`], to be
/// run by whoever drains it.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl ChannelDispatcher {
    /// Creates the dispatcher and the receiving end of its queue.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("Dispatch queue closed, dropping completion");
        }
    }
}

/// Decorator rerouting the completions of any loader through a [`Dispatcher`].
pub struct Dispatching<T, D> {
    decoratee: T,
    dispatcher: Arc<D>,
}

impl<T, D: Dispatcher> Dispatching<T, D> {
    /// Wraps `decoratee`.
    #[must_use]
    pub fn new(decoratee: T, dispatcher: Arc<D>) -> Self {
        Self {
            decoratee,
            dispatcher,
        }
    }

    /// Returns a completion that forwards its result to `completion` on the
    /// dispatcher.
    fn redirect<R, E>(&self, completion: Completion<R, E>) -> Completion<R, E>
    where
        R: Send + 'static,
        E: Send + 'static,
    {
        let dispatcher = Arc::clone(&self.dispatcher);
        Box::new(move |result| dispatcher.dispatch(Box::new(move || completion(result))))
    }

    /// Like [`Self::redirect`], but the returned task also suppresses a
    /// completion that is already queued on the dispatcher.
    fn redirect_cancellable<R, E>(
        &self,
        completion: Completion<R, E>,
        start: impl FnOnce(Completion<R, E>) -> Box<dyn LoadTask>,
    ) -> Box<dyn LoadTask>
    where
        R: Send + 'static,
        E: Send + 'static,
    {
        let slot = CompletionSlot::new(completion);
        let delivery = slot.clone();
        let task = ForwardingTask::new(slot);
        let inner = start(self.redirect(Box::new(move |result| {
            delivery.complete(result);
        })));
        task.attach(inner);
        Box::new(task)
    }
}

impl<T: PhotoLoader, D: Dispatcher> PhotoLoader for Dispatching<T, D> {
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        self.redirect_cancellable(completion, |completion| {
            self.decoratee.load(url, completion)
        })
    }
}

impl<T: PetLoader, D: Dispatcher> PetLoader for Dispatching<T, D> {
    fn load(&self, page: PageRequest, completion: Completion<Vec<Pet>, PetListError>) {
        self.decoratee.load(page, self.redirect(completion));
    }
}

impl<T: PhotoCache, D: Dispatcher> PhotoCache for Dispatching<T, D> {
    fn save(&self, data: Bytes, url: &Url, completion: Completion<(), PhotoError>) {
        self.decoratee.save(data, url, self.redirect(completion));
    }
}
