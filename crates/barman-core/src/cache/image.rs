use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::api::{Endpoints, HttpTransport};
use crate::utils::fs::write_atomic;

use super::ImageError;

/// Images directory name inside the data directory
pub const IMAGES_DIR: &str = "images";

type SharedDownload = Shared<BoxFuture<'static, Result<Bytes, ImageError>>>;

/// Derive an image identifier from the last path segment of an image URL.
/// The segment is percent-decoded, the inverse of `Endpoints::image_url`.
pub fn image_id_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(last).ok()?;
    validate_id(&decoded).ok()?;
    Some(decoded.into_owned())
}

/// An identifier names exactly one file directly inside the images directory.
fn validate_id(image_id: &str) -> Result<(), ImageError> {
    let invalid = image_id.is_empty()
        || image_id == "."
        || image_id == ".."
        || image_id.contains(['/', '\\', '\0']);
    if invalid {
        Err(ImageError::InvalidId(image_id.to_string()))
    } else {
        Ok(())
    }
}

/// Permanent on-disk cache of drink images.
///
/// An image is downloaded the first time it is requested and served from
/// disk from then on. Entries are never evicted or revalidated. Concurrent
/// requests for the same image share a single download.
///
/// Clone is cheap; clones share the in-flight table.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<Inner>,
}

struct Inner {
    images_dir: PathBuf,
    endpoints: Endpoints,
    transport: Arc<dyn HttpTransport>,
    in_flight: Mutex<HashMap<String, SharedDownload>>,
}

/// Removes an in-flight entry when its download task ends, however it ends.
struct InFlightEntry {
    inner: Arc<Inner>,
    image_id: String,
}

impl Drop for InFlightEntry {
    fn drop(&mut self) {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.image_id);
    }
}

impl ImageCache {
    /// The directory is created on the first successful download.
    pub fn new(
        images_dir: impl Into<PathBuf>,
        transport: Arc<dyn HttpTransport>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                images_dir: images_dir.into(),
                endpoints,
                transport,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.inner.images_dir
    }

    /// Resolve the on-disk location for an image identifier.
    pub fn path_for(&self, image_id: &str) -> Result<PathBuf, ImageError> {
        validate_id(image_id)?;
        Ok(self.inner.path_for(image_id))
    }

    /// Whether the image is already on disk.
    pub async fn contains(&self, image_id: &str) -> bool {
        match self.path_for(image_id) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get an image's bytes, downloading and storing them on first use.
    pub async fn get(&self, image_id: &str) -> Result<Bytes, ImageError> {
        validate_id(image_id)?;

        if let Some(bytes) = self.inner.read_cached(image_id).await? {
            debug!(image_id, size = bytes.len(), "Image cache hit");
            return Ok(bytes);
        }

        self.join_download(image_id).await
    }

    /// Return the in-flight download for `image_id`, starting one if none exists.
    fn join_download(&self, image_id: &str) -> SharedDownload {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(download) = in_flight.get(image_id) {
            debug!(image_id, "Joining in-flight image download");
            return download.clone();
        }

        // The task owns the download so it finishes and populates the cache
        // even if every caller stops waiting.
        let entry = InFlightEntry {
            inner: Arc::clone(&self.inner),
            image_id: image_id.to_string(),
        };
        let handle = tokio::spawn(async move {
            let result = entry.inner.load_or_download(&entry.image_id).await;
            drop(entry);
            result
        });

        let id = image_id.to_string();
        let download = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ImageError::download(&id, e)))
        }
        .boxed()
        .shared();

        in_flight.insert(image_id.to_string(), download.clone());
        download
    }
}

impl Inner {
    fn path_for(&self, image_id: &str) -> PathBuf {
        self.images_dir.join(image_id)
    }

    async fn read_cached(&self, image_id: &str) -> Result<Option<Bytes>, ImageError> {
        match tokio::fs::read(self.path_for(image_id)).await {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!(image_id, error = %e, "Failed to read cached image");
                Err(ImageError::persist(image_id, e))
            }
        }
    }

    async fn load_or_download(&self, image_id: &str) -> Result<Bytes, ImageError> {
        // A previous download may have landed between the caller's disk check
        // and this task starting.
        if let Some(bytes) = self.read_cached(image_id).await? {
            return Ok(bytes);
        }

        let url = self.endpoints.image_url(image_id);
        debug!(image_id, url = %url, "Downloading image");

        let bytes = self.transport.get(&url).await.map_err(|e| {
            warn!(image_id, error = %e, "Failed to download image");
            ImageError::download(image_id, e)
        })?;

        if bytes.is_empty() {
            warn!(image_id, "Image download returned an empty body");
            return Err(ImageError::download(image_id, "empty response body"));
        }

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| ImageError::persist(image_id, e))?;

        write_atomic(&self.path_for(image_id), bytes.clone())
            .await
            .map_err(|e| {
                warn!(image_id, error = %e, "Failed to save image");
                ImageError::persist(image_id, e)
            })?;

        debug!(image_id, size = bytes.len(), "Image cached");
        Ok(bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================
