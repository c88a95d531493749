use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Drink;
use crate::utils::fs::{parent_dir, write_atomic};

use super::PersistError;

/// Store file name in the data directory
pub const STORE_FILE: &str = "drinks.json";

/// A user drink as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDrink {
    #[serde(flatten)]
    pub drink: Drink,
    pub added_at: DateTime<Utc>,
}

impl StoredDrink {
    pub fn new(drink: Drink) -> Self {
        Self {
            drink,
            added_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    drinks: Vec<StoredDrink>,
}

/// Result of reading the store. Reading never fails outright: an unreadable
/// store yields no drinks and a warning for the caller to surface.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub drinks: Vec<Drink>,
    pub warning: Option<String>,
}

/// Durable storage for user-authored drinks, kept as a single JSON document.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles in `append`.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Open the store at `path`, creating its directory if needed.
    /// The file itself is created on first append.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let dir = parent_dir(&path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PersistError::io(dir, e))?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Open `drinks.json` inside `data_dir`.
    pub async fn open_in(data_dir: &Path) -> Result<Self, PersistError> {
        Self::open(data_dir.join(STORE_FILE)).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<StoredDrink>, PersistError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistError::io(&self.path, e)),
        };

        let file: StoreFile =
            serde_json::from_slice(&contents).map_err(|source| PersistError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(file.drinks)
    }

    /// Read every stored drink in insertion order.
    pub async fn load_all(&self) -> LoadOutcome {
        match self.read_records().await {
            Ok(records) => {
                debug!(count = records.len(), path = ?self.path, "Loaded user drinks");
                LoadOutcome {
                    drinks: records.into_iter().map(|r| r.drink).collect(),
                    warning: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load user drinks, continuing without them");
                LoadOutcome {
                    drinks: Vec::new(),
                    warning: Some(e.to_string()),
                }
            }
        }
    }

    /// Persist one drink after the existing ones.
    ///
    /// An unreadable store is not overwritten; the append fails with
    /// `PersistError::Corrupt` and the file is left for inspection.
    pub async fn append(&self, drink: Drink) -> Result<(), PersistError> {
        let _guard = self.write_lock.lock().await;

        let mut drinks = self.read_records().await?;
        drinks.push(StoredDrink::new(drink));
        let count = drinks.len();

        let contents = serde_json::to_vec_pretty(&StoreFile { drinks })?;
        write_atomic(&self.path, contents)
            .await
            .map_err(|e| PersistError::io(&self.path, e))?;

        debug!(count, path = ?self.path, "User drink saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
