//! HTTP transport port definition.

use bytes::Bytes;
use reqwest::{StatusCode, Url};

use crate::domain::errors::TransportError;
use crate::domain::task::{Completion, LoadTask};

/// Raw answer of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Port for issuing GET requests.
///
/// Each call delivers exactly one result unless the returned task is cancelled
/// first. Cancelling aborts the request.
pub trait HttpClient: Send + Sync {
    /// Issues a GET request for `url`.
    fn get(
        &self,
        url: &Url,
        completion: Completion<HttpResponse, TransportError>,
    ) -> Box<dyn LoadTask>;
}

impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    fn get(
        &self,
        url: &Url,
        completion: Completion<HttpResponse, TransportError>,
    ) -> Box<dyn LoadTask> {
        (**self).get(url, completion)
    }
}
