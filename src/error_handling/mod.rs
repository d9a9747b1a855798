//! Error handling.
//!
//! This module provides:
//! - Fatal error types (`ScanError`, `InitializationError`)
//! - The browser collaborator's error type (`BrowserError`)
//! - Degraded-section bookkeeping (`Section`, `PartialFailure`, `PartialFailures`)
//!
//! Errors are split into two classes:
//! - **Fatal**: the browser cannot launch or the primary page cannot load
//! - **Degraded**: any other sub-analysis failure; the affected section becomes
//!   an explicit empty/error value and the scan continues

mod types;

use std::sync::Mutex;

use log::warn;

// Re-export public API
pub use types::{BrowserError, InitializationError, PartialFailure, ScanError, Section};

/// Collects partial failures for one scan.
///
/// Sub-analyses running concurrently record into the same collector, so the
/// list is guarded by a mutex; order is order of occurrence.
#[derive(Debug, Default)]
pub struct PartialFailures {
    failures: Mutex<Vec<PartialFailure>>,
}

impl PartialFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs and records a degraded section.
    pub fn record(&self, section: Section, message: impl AsRef<str>) {
        let failure = PartialFailure::new(section, message);
        warn!("{} degraded: {}", section, failure.message);
        match self.failures.lock() {
            Ok(mut failures) => failures.push(failure),
            Err(poisoned) => poisoned.into_inner().push(failure),
        }
    }

    /// Returns the recorded failures, leaving the collector empty.
    pub fn take(&self) -> Vec<PartialFailure> {
        match self.failures.lock() {
            Ok(mut failures) => std::mem::take(&mut *failures),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
