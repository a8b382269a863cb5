//! Photo loader fetching image bytes over HTTP.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{StatusCode, Url};
use tracing::{debug, trace};

use crate::domain::errors::{PhotoError, TransportError};
use crate::domain::ports::{HttpClient, HttpResponse, PhotoLoader};
use crate::domain::task::{Completion, CompletionSlot, ForwardingTask, LoadTask};

/// Downloads photos through an [`HttpClient`].
///
/// Only a `200 OK` with a non-empty body counts as a photo.
pub struct RemotePhotoLoader<C> {
    client: Arc<C>,
}

impl<C: HttpClient + 'static> RemotePhotoLoader<C> {
    /// Creates a loader using `client`.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn map_response(
    url: &Url,
    result: Result<HttpResponse, TransportError>,
) -> Result<Bytes, PhotoError> {
    let response = result.map_err(|e| {
        debug!(url = %url, error = %e, "Photo download failed");
        PhotoError::Connectivity
    })?;

    if response.status != StatusCode::OK || response.body.is_empty() {
        debug!(
            url = %url,
            status = %response.status,
            size = response.body.len(),
            "Photo response rejected"
        );
        return Err(PhotoError::InvalidData);
    }

    trace!(url = %url, size = response.body.len(), "Photo downloaded");
    Ok(response.body)
}

impl<C: HttpClient + 'static> PhotoLoader for RemotePhotoLoader<C> {
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        let slot = CompletionSlot::new(completion);
        let delivery = slot.clone();
        let task = ForwardingTask::new(slot);
        let owner = Arc::downgrade(&self.client);
        let requested = url.clone();

        let http_task = self.client.get(
            url,
            Box::new(move |result| {
                if owner.upgrade().is_none() {
                    return;
                }
                delivery.complete(map_response(&requested, result));
            }),
        );
        task.attach(http_task);

        Box::new(task)
    }
}
