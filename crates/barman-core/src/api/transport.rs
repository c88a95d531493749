//! HTTP transport used by the catalog fetcher and the image cache.
//!
//! `HttpTransport` is the seam between the core and the network. The
//! production implementation wraps a pooled `reqwest::Client`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use super::TransportError;

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET and return the full response body.
    /// Non-success statuses are reported as `TransportError::Status`.
    async fn get(&self, url: &str) -> Result<Bytes, TransportError>;
}

/// Transport backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    enum Reply {
        Body(Bytes),
        Status(u16),
    }

    /// In-memory transport that serves canned responses and counts requests.
    pub struct FakeTransport {
        replies: Mutex<HashMap<String, Reply>>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
        delay: Duration,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self {
                replies: Mutex::new(HashMap::new()),
                calls: Mutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        /// Hold every response for `delay` so concurrent callers overlap.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn respond(&self, url: &str, body: impl Into<Bytes>) {
            self.replies
                .lock()
                .unwrap()
                .insert(url.to_string(), Reply::Body(body.into()));
        }

        pub fn fail(&self, url: &str, status: u16) {
            self.replies
                .lock()
                .unwrap()
                .insert(url.to_string(), Reply::Status(status));
        }

        pub fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.replies.lock().unwrap().get(url) {
                Some(Reply::Body(body)) => Ok(body.clone()),
                Some(Reply::Status(status)) => Err(TransportError::Status {
                    status: *status,
                    body: String::new(),
                }),
                None => Err(TransportError::Status {
                    status: 404,
                    body: format!("no route for {url}"),
                }),
            }
        }
    }
}
