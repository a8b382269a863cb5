//! Composite loader that falls back to a second source on failure.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Url;
use tracing::debug;

use crate::domain::errors::PhotoError;
use crate::domain::ports::PhotoLoader;
use crate::domain::task::{Completion, CompletionSlot, LoadTask};

/// Tries `primary` first and only asks `fallback` once `primary` fails.
pub struct FallbackPhotoLoader<P, F> {
    primary: P,
    fallback: Arc<F>,
}

impl<P, F> FallbackPhotoLoader<P, F>
where
    P: PhotoLoader,
    F: PhotoLoader + 'static,
{
    /// Creates the composite.
    #[must_use]
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback: Arc::new(fallback),
        }
    }
}

/// Which sub-task a [`FallbackTask`] currently stands for.
enum Stage {
    Starting,
    Primary(Box<dyn LoadTask>),
    /// Primary failed and the fallback load is being issued.
    Dispatching,
    Fallback(Box<dyn LoadTask>),
    Cancelled,
}

struct FallbackTask {
    slot: CompletionSlot<Bytes, PhotoError>,
    stage: Mutex<Stage>,
}

impl FallbackTask {
    fn attach_primary(&self, task: Box<dyn LoadTask>) {
        let mut stage = self.stage.lock();
        if matches!(*stage, Stage::Starting) {
            *stage = Stage::Primary(task);
            return;
        }
        // otherwise the primary already finished synchronously, or was cancelled
        let cancelled = matches!(*stage, Stage::Cancelled);
        drop(stage);
        if cancelled {
            task.cancel();
        }
    }

    /// Moves to [`Stage::Dispatching`]. Returns false if cancelled, already
    /// delivered, or already falling back.
    fn begin_fallback(&self) -> bool {
        let mut stage = self.stage.lock();
        let primary_running = matches!(*stage, Stage::Starting | Stage::Primary(_));
        if !primary_running || !self.slot.is_pending() {
            return false;
        }
        *stage = Stage::Dispatching;
        true
    }

    fn attach_fallback(&self, task: Box<dyn LoadTask>) {
        let mut stage = self.stage.lock();
        if matches!(*stage, Stage::Cancelled) {
            drop(stage);
            task.cancel();
            return;
        }
        *stage = Stage::Fallback(task);
    }
}

impl LoadTask for FallbackTask {
    fn cancel(&self) {
        self.slot.cancel();
        let previous = std::mem::replace(&mut *self.stage.lock(), Stage::Cancelled);
        match previous {
            Stage::Primary(task) | Stage::Fallback(task) => task.cancel(),
            Stage::Starting | Stage::Dispatching | Stage::Cancelled => {}
        }
    }
}

struct SharedTask(Arc<FallbackTask>);

impl LoadTask for SharedTask {
    fn cancel(&self) {
        self.0.cancel();
    }
}

impl<P, F> PhotoLoader for FallbackPhotoLoader<P, F>
where
    P: PhotoLoader,
    F: PhotoLoader + 'static,
{
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        let task = Arc::new(FallbackTask {
            slot: CompletionSlot::new(completion),
            stage: Mutex::new(Stage::Starting),
        });

        let handle = Arc::clone(&task);
        let fallback = Arc::clone(&self.fallback);
        let fallback_url = url.clone();

        let primary = self.primary.load(
            url,
            Box::new(move |result| match result {
                Ok(data) => {
                    handle.slot.complete(Ok(data));
                }
                Err(error) => {
                    if !handle.begin_fallback() {
                        return;
                    }
                    debug!(
                        url = %fallback_url,
                        error = %error,
                        "Primary photo source failed, falling back"
                    );
                    let delivery = handle.slot.clone();
                    let sub_task = fallback.load(
                        &fallback_url,
                        Box::new(move |result| {
                            delivery.complete(result);
                        }),
                    );
                    handle.attach_fallback(sub_task);
                }
            }),
        );
        task.attach_primary(primary);

        Box::new(SharedTask(task))
    }
}
