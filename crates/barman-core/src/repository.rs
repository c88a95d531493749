//! The drink repository: one read/write surface over remote and user drinks.
//!
//! `DrinkRepository` owns two lists, the remote catalog (replaced wholesale
//! on every successful refresh) and the user's own drinks (loaded from the
//! local store at construction and appended to on every add). The merged
//! view is always remote drinks followed by user drinks.
//!
//! Work can also be started in the background. Spawned tasks never touch
//! repository state; they send their results through a channel and the
//! owner applies them in `process_pending_events`.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{DrinkFetcher, FetchError};
use crate::cache::{ImageCache, ImageError};
use crate::models::{Drink, DrinkId};
use crate::store::{LocalStore, PersistError};

/// Buffer size for the background result channel
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Where a drink in the merged view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrinkSource {
    Remote,
    Local,
}

impl DrinkSource {
    pub fn label(&self) -> &'static str {
        match self {
            DrinkSource::Remote => "catalog",
            DrinkSource::Local => "mine",
        }
    }
}

/// Result sent back from a spawned task
enum BackgroundResult {
    Remote {
        generation: u64,
        result: Result<Vec<Drink>, FetchError>,
    },
    Image {
        drink_id: DrinkId,
        image_id: String,
        result: Result<Bytes, ImageError>,
    },
}

/// Outcome of background work, reported after it has been applied.
#[derive(Debug)]
pub enum RepositoryEvent {
    /// The remote catalog was replaced; `count` is the new remote size.
    RemoteRefreshed { count: usize },
    /// The refresh failed and the previous remote drinks were kept.
    RemoteRefreshFailed(FetchError),
    /// An image requested in the background finished loading.
    ImageLoaded {
        drink_id: DrinkId,
        image_id: String,
        result: Result<Bytes, ImageError>,
    },
}

pub struct DrinkRepository {
    fetcher: DrinkFetcher,
    store: LocalStore,
    images: ImageCache,

    remote_drinks: Vec<Drink>,
    local_drinks: Vec<Drink>,
    load_warning: Option<String>,

    /// Last refresh generation handed out
    refresh_generation: u64,
    /// Generation of the catalog currently in `remote_drinks`
    applied_generation: u64,

    // Background task channel
    results_tx: mpsc::Sender<BackgroundResult>,
    results_rx: mpsc::Receiver<BackgroundResult>,
}

impl DrinkRepository {
    /// Build the repository, loading user drinks from the store.
    ///
    /// An unreadable store does not fail construction: the repository starts
    /// with no user drinks and the reason is kept in `load_warning`.
    pub async fn new(fetcher: DrinkFetcher, store: LocalStore, images: ImageCache) -> Self {
        let outcome = store.load_all().await;
        debug!(
            local = outcome.drinks.len(),
            warning = outcome.warning.is_some(),
            "Drink repository initialized"
        );

        let (results_tx, results_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            fetcher,
            store,
            images,
            remote_drinks: Vec::new(),
            local_drinks: outcome.drinks,
            load_warning: outcome.warning,
            refresh_generation: 0,
            applied_generation: 0,
            results_tx,
            results_rx,
        }
    }

    /// Snapshot of every drink: remote drinks first, then user drinks.
    pub fn all(&self) -> Vec<Drink> {
        self.remote_drinks
            .iter()
            .chain(self.local_drinks.iter())
            .cloned()
            .collect()
    }

    /// Drinks in merged order, tagged with their source.
    pub fn entries(&self) -> impl Iterator<Item = (DrinkSource, &Drink)> {
        self.remote_drinks
            .iter()
            .map(|d| (DrinkSource::Remote, d))
            .chain(self.local_drinks.iter().map(|d| (DrinkSource::Local, d)))
    }

    pub fn len(&self) -> usize {
        self.remote_drinks.len() + self.local_drinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drink at `index` in the merged view
    pub fn get(&self, index: usize) -> Option<Drink> {
        self.entries().nth(index).map(|(_, d)| d.clone())
    }

    /// First drink in merged order with the given id
    pub fn find(&self, id: DrinkId) -> Option<Drink> {
        self.entries()
            .map(|(_, d)| d)
            .find(|d| d.id() == id)
            .cloned()
    }

    /// Why user drinks could not be loaded at startup, if they could not.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Fetch the remote catalog and replace the remote drinks with it.
    /// On failure the current remote drinks are kept.
    pub async fn refresh_remote(&mut self) -> Result<Vec<Drink>, FetchError> {
        let generation = self.next_generation();
        let drinks = self.fetcher.fetch_all().await?;
        self.replace_remote(generation, drinks);
        Ok(self.all())
    }

    fn next_generation(&mut self) -> u64 {
        self.refresh_generation += 1;
        self.refresh_generation
    }

    /// Catalogs are applied in the order their refreshes started, so a slow
    /// refresh never overwrites the result of a later one.
    fn is_stale(&self, generation: u64) -> bool {
        generation <= self.applied_generation
    }

    fn replace_remote(&mut self, generation: u64, drinks: Vec<Drink>) {
        info!(
            generation,
            previous = self.remote_drinks.len(),
            current = drinks.len(),
            "Remote drinks replaced"
        );
        self.remote_drinks = drinks;
        self.applied_generation = generation;
    }

    /// Persist a user drink, then add it to the merged view.
    /// Nothing changes in memory if the write fails.
    pub async fn add_user_drink(&mut self, drink: Drink) -> Result<(), PersistError> {
        if let Err(e) = self.store.append(drink.clone()).await {
            warn!(name = %drink.name, error = %e, "Failed to save user drink");
            return Err(e);
        }
        info!(name = %drink.name, "User drink added");
        self.local_drinks.push(drink);
        Ok(())
    }

    /// Image bytes for a drink, from the cache or downloaded on first use.
    pub async fn image_for(&self, drink: &Drink) -> Result<Bytes, ImageError> {
        self.images.get(&drink.img).await
    }

    // ===== Background Operations =====

    /// Helper to send background results, logging if the owner is gone
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            debug!("Background result dropped - repository no longer listening");
        }
    }

    /// Start a catalog refresh without waiting for it.
    /// The result is applied by the next `process_pending_events`.
    /// A result that arrives after a later refresh has been applied is dropped.
    pub fn refresh_remote_background(&mut self) {
        let generation = self.next_generation();
        let fetcher = self.fetcher.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_all().await;
            Self::send_result(&tx, BackgroundResult::Remote { generation, result }).await;
        });
    }

    /// Start loading a drink's image without waiting for it.
    pub fn request_image_background(&self, drink: &Drink) {
        let images = self.images.clone();
        let tx = self.results_tx.clone();
        let drink_id = drink.id();
        let image_id = drink.img.clone();
        tokio::spawn(async move {
            let result = images.get(&image_id).await;
            Self::send_result(
                &tx,
                BackgroundResult::Image {
                    drink_id,
                    image_id,
                    result,
                },
            )
            .await;
        });
    }

    /// Apply every background result received so far and report them.
    /// Superseded refresh results are dropped without an event.
    pub fn process_pending_events(&mut self) -> Vec<RepositoryEvent> {
        let mut results = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            results.push(result);
        }

        results
            .into_iter()
            .filter_map(|result| self.apply_result(result))
            .collect()
    }

    /// Wait for the next background result that produces an event and apply it.
    ///
    /// Only call this after starting background work; the repository keeps
    /// its own sender, so with nothing in flight this waits forever.
    pub async fn next_event(&mut self) -> Option<RepositoryEvent> {
        loop {
            let result = self.results_rx.recv().await?;
            if let Some(event) = self.apply_result(result) {
                return Some(event);
            }
        }
    }

    fn apply_result(&mut self, result: BackgroundResult) -> Option<RepositoryEvent> {
        match result {
            BackgroundResult::Remote { generation, .. } if self.is_stale(generation) => {
                debug!(
                    generation,
                    applied = self.applied_generation,
                    "Discarding superseded background refresh"
                );
                None
            }
            BackgroundResult::Remote {
                generation,
                result: Ok(drinks),
            } => {
                let count = drinks.len();
                self.replace_remote(generation, drinks);
                Some(RepositoryEvent::RemoteRefreshed { count })
            }
            BackgroundResult::Remote { result: Err(e), .. } => {
                warn!(error = %e, "Background refresh failed, keeping previous drinks");
                Some(RepositoryEvent::RemoteRefreshFailed(e))
            }
            BackgroundResult::Image {
                drink_id,
                image_id,
                result,
            } => Some(RepositoryEvent::ImageLoaded {
                drink_id,
                image_id,
                result,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
