//! Per-scan settings derived from the configuration.

use std::time::Duration;

use crate::browser::LaunchConfig;
use crate::config::{Config, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// The knobs the scan pipeline reads.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub launch: LaunchConfig,
    /// Primary navigation budget; exceeding it fails the scan.
    pub navigation_timeout: Duration,
    /// Budget of each deep-link probe.
    pub probe_timeout: Duration,
    pub deep_link_limit: usize,
    pub deep_link_concurrency: usize,
    pub screenshot: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ScanSettings {
    fn from(config: &Config) -> Self {
        Self {
            launch: LaunchConfig {
                headless: true,
                user_agent: config.user_agent.clone(),
                viewport: (VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
                executable: config.chrome_path.clone(),
            },
            navigation_timeout: config.navigation_timeout(),
            probe_timeout: config.probe_timeout(),
            deep_link_limit: config.deep_link_limit,
            deep_link_concurrency: config.deep_link_concurrency.max(1),
            screenshot: config.screenshot,
        }
    }
}
