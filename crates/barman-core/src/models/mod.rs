//! Data models for drink recipes.
//!
//! - `Drink`: the recipe record shared by the remote catalog and the local store
//! - `DrinkId`: content-derived identifier used to look drinks up

pub mod drink;

pub use drink::{Drink, DrinkId, ValidationError};
