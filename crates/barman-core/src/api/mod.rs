//! Remote access to the drinks service.
//!
//! This module provides the `DrinkFetcher` for downloading the drink
//! catalog and the `HttpTransport` seam it shares with the image cache.
//! The service needs no authentication.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{DrinkFetcher, Endpoints, DEFAULT_BASE_URL};
pub use error::{FetchError, TransportError};
pub use transport::{HttpTransport, ReqwestTransport, DEFAULT_REQUEST_TIMEOUT_SECS};

#[cfg(test)]
pub(crate) use transport::testing;
