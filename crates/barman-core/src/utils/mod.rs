//! Utility functions for display formatting and file handling.

pub mod format;
pub mod fs;

// Re-export commonly used functions at module level
pub use format::{format_size, single_line, truncate_string};
pub use fs::write_atomic;
