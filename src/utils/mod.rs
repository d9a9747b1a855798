//! Utility functions.
//!
//! This module provides string sanitization and truncation helpers shared by
//! the analysis modules.

pub mod sanitize;

pub use sanitize::truncate_chars;
