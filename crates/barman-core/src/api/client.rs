//! Fetcher for the remote drink catalog.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::Drink;

use super::{FetchError, HttpTransport};

/// Base URL of the drinks service.
pub const DEFAULT_BASE_URL: &str = "http://janzelaznog.com/DDAM/iOS";

/// Remote endpoints derived from a single base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/drinks.json", self.base_url)
    }

    /// The id is percent-encoded so `?`, `#` and spaces stay in the path.
    pub fn image_url(&self, image_id: &str) -> String {
        format!(
            "{}/drinksimages/{}",
            self.base_url,
            urlencoding::encode(image_id)
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Fetches and decodes the remote catalog. Holds no state between calls.
#[derive(Clone)]
pub struct DrinkFetcher {
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
}

impl DrinkFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Fetch the full catalog. No retry on either transport or decode failure.
    pub async fn fetch_all(&self) -> Result<Vec<Drink>, FetchError> {
        let url = self.endpoints.catalog_url();

        let body = self.transport.get(&url).await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to download drink catalog");
            e
        })?;

        let drinks: Vec<Drink> = serde_json::from_slice(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to decode drink catalog");
            e
        })?;

        debug!(count = drinks.len(), "Drink catalog fetched");
        Ok(drinks)
    }
}
