//! redirect_detector library: web-page risk analysis in a headless browser
//!
//! Given a URL, the scanner renders the page in an isolated browser session,
//! observes its redirects, network traffic and DOM, samples where its links
//! lead, inspects the landing server, consults a threat feed, and produces a
//! [`RiskReport`] with a technical score, a deception score and plain-language
//! summary lines.
//!
//! # Example
//!
//! ```no_run
//! use redirect_detector::{run_scan, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! redirect_detector::initialization::init_crypto_provider();
//! let config = Config {
//!     url: "example.com".to_string(),
//!     deep_link_limit: 3,
//!     ..Default::default()
//! };
//!
//! let report = run_scan(config).await?;
//! println!("{} ({:?})", report.final_url, report.simple_analysis.phishing_verdict);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime and, for [`run_scan`], a local
//! Chrome/Chromium installation (auto-detected, or `CHROME_PATH`).
//! [`Scanner`] accepts any [`browser::BrowserLauncher`] and
//! [`threat::ThreatFeed`], so the pipeline can run against other
//! collaborators.

pub mod analysis;
mod app;
pub mod browser;
pub mod config;
mod dns;
pub mod error_handling;
mod geoip;
pub mod initialization;
pub mod report;
mod run;
pub mod scoring;
pub mod server_info;
mod tls;
pub mod threat;
mod utils;

// Re-export public API
pub use app::normalize_target_url;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{BrowserError, PartialFailure, ScanError, Section};
pub use report::RiskReport;
pub use run::{run_scan, ScanSettings, Scanner};
