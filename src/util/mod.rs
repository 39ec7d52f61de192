//! Utility functions for common operations.
//!
//! Currently text layout only: greedy word wrapping for the summary and
//! content panels, and width-aware padding for list rows.

mod text;

pub use text::{display_width, pad_to_width, wrap};
