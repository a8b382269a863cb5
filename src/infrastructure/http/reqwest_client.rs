//! reqwest-backed HTTP transport.

use std::time::Duration;

use reqwest::{Client, Url};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{trace, warn};

use crate::domain::errors::TransportError;
use crate::domain::ports::{HttpClient, HttpResponse};
use crate::domain::task::{Completion, CompletionSlot, LoadTask};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("petshelf/", env!("CARGO_PKG_VERSION"));

/// HTTP transport running each request as a task on a tokio runtime.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    runtime: Handle,
}

impl ReqwestHttpClient {
    /// Creates a client with default settings on the current runtime.
    ///
    /// # Errors
    /// Returns error if no tokio runtime is running or the client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom user agent and timeout on the current
    /// runtime.
    ///
    /// # Errors
    /// Returns error if no tokio runtime is running or the client cannot be built.
    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let runtime = Handle::try_current()
            .map_err(|e| TransportError::setup(format!("no tokio runtime: {e}")))?;

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::setup(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, runtime })
    }
}

impl std::fmt::Debug for ReqwestHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestHttpClient").finish_non_exhaustive()
    }
}

/// Reports [`TransportError::UnexpectedCompletion`] if the request future is
/// dropped before it delivered anything and without being cancelled.
struct DeliveryGuard(CompletionSlot<HttpResponse, TransportError>);

impl DeliveryGuard {
    fn deliver(&self, result: Result<HttpResponse, TransportError>) {
        self.0.complete(result);
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        if self.0.complete(Err(TransportError::UnexpectedCompletion)) {
            warn!("HTTP request ended without a result");
        }
    }
}

struct HttpTask {
    slot: CompletionSlot<HttpResponse, TransportError>,
    abort: AbortHandle,
}

impl LoadTask for HttpTask {
    fn cancel(&self) {
        self.slot.cancel();
        self.abort.abort();
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "failed to connect".to_string()
    } else {
        error.to_string()
    }
}

async fn execute(client: Client, url: Url) -> Result<HttpResponse, TransportError> {
    let response = client.get(url.clone()).send().await.map_err(|e| {
        warn!(url = %url, error = %e, "HTTP request failed");
        TransportError::connectivity(describe(&e))
    })?;

    let status = response.status();
    let body = response.bytes().await.map_err(|e| {
        warn!(url = %url, error = %e, "Failed to read HTTP body");
        TransportError::connectivity(describe(&e))
    })?;

    trace!(url = %url, status = %status, size = body.len(), "HTTP response received");

    Ok(HttpResponse::new(status, body))
}

impl HttpClient for ReqwestHttpClient {
    fn get(
        &self,
        url: &Url,
        completion: Completion<HttpResponse, TransportError>,
    ) -> Box<dyn LoadTask> {
        let slot = CompletionSlot::new(completion);
        let guard = DeliveryGuard(slot.clone());
        let client = self.client.clone();
        let url = url.clone();

        let handle = self.runtime.spawn(async move {
            let result = execute(client, url).await;
            guard.deliver(result);
        });

        Box::new(HttpTask {
            slot,
            abort: handle.abort_handle(),
        })
    }
}
