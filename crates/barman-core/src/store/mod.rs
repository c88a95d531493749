//! Local persistence for user-authored drinks.
//!
//! Drinks added by the user are kept in a JSON document in the data
//! directory. Records are only ever appended; every write replaces the file
//! atomically so a reader never observes a partial record.

pub mod error;
pub mod local;

pub use error::PersistError;
pub use local::{LoadOutcome, LocalStore, StoredDrink, STORE_FILE};
