//! Barman core - drink catalog sync and image caching.
//!
//! This crate merges the remote drink catalog with drinks the user has
//! added locally, and keeps a permanent on-disk cache of drink images.
//! Front ends construct one `DrinkRepository` and go through it for
//! everything.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use api::{DrinkFetcher, Endpoints, FetchError, HttpTransport, ReqwestTransport};
pub use cache::{ImageCache, ImageError};
pub use config::Config;
pub use models::{Drink, DrinkId, ValidationError};
pub use repository::{DrinkRepository, DrinkSource, RepositoryEvent};
pub use store::{LocalStore, PersistError};
