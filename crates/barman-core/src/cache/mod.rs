//! On-disk image cache.
//!
//! This module provides the `ImageCache` for drink images. Images are keyed
//! by identifier (the file name on the server), downloaded once, and kept in
//! the images directory indefinitely. There is no eviction or revalidation:
//! image names are assumed to refer to immutable content.

pub mod error;
pub mod image;

pub use error::ImageError;
pub use image::{image_id_from_url, ImageCache, IMAGES_DIR};
