use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Namespace for name-based drink identifiers.
const DRINK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d4e_8a3b_4c5d_9e7f_0a1b_2c3d_4e5f);

/// A recipe record as served by the remote catalog and stored for user drinks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drink {
    pub name: String,
    pub ingredients: String,
    pub directions: String,
    /// Image identifier (a filename); empty when the drink has no image.
    pub img: String,
}

/// Stable synthetic identifier for a drink, derived from its name and image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrinkId(Uuid);

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell list entries apart
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Drink {0} must not be empty")]
    EmptyField(&'static str),
}

impl Drink {
    pub fn new(
        name: impl Into<String>,
        ingredients: impl Into<String>,
        directions: impl Into<String>,
        img: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into(),
            directions: directions.into(),
            img: img.into(),
        }
    }

    /// Content-derived identifier. Drinks with the same name and image share an id.
    pub fn id(&self) -> DrinkId {
        let mut key = Vec::with_capacity(self.name.len() + self.img.len() + 1);
        key.extend_from_slice(self.name.as_bytes());
        key.push(0);
        key.extend_from_slice(self.img.as_bytes());
        DrinkId(Uuid::new_v5(&DRINK_ID_NAMESPACE, &key))
    }

    pub fn has_image(&self) -> bool {
        !self.img.is_empty()
    }

    /// Check a user-entered drink before it is saved.
    /// Name, ingredients and directions are required; the image is optional.
    pub fn validate_user_entry(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("ingredients", &self.ingredients),
            ("directions", &self.directions),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }
        Ok(())
    }
}
