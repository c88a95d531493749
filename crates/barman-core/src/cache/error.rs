use thiserror::Error;

/// Failure resolving a drink image.
///
/// Clone so that every caller sharing one download receives the same value;
/// underlying causes are carried as text for that reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Invalid image identifier: {0:?}")]
    InvalidId(String),

    #[error("Failed to download image {image_id}: {reason}")]
    Download { image_id: String, reason: String },

    #[error("Failed to store image {image_id}: {reason}")]
    Persist { image_id: String, reason: String },
}

impl ImageError {
    pub(crate) fn download(image_id: &str, reason: impl ToString) -> Self {
        ImageError::Download {
            image_id: image_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn persist(image_id: &str, reason: impl ToString) -> Self {
        ImageError::Persist {
            image_id: image_id.to_string(),
            reason: reason.to_string(),
        }
    }
}
