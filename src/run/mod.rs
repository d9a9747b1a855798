//! Scan orchestration.
//!
//! [`Scanner`] runs the pipeline against injected collaborators;
//! [`run_scan`] wires the production ones (headless Chromium, URLhaus,
//! hickory resolver, reqwest) from a [`Config`].

mod scanner;
mod settings;

use anyhow::{Context, Result};
use log::info;

use crate::browser::ChromiumLauncher;
use crate::config::Config;
use crate::initialization::{init_client, init_resolver};
use crate::report::RiskReport;
use crate::server_info::ServerIntel;
use crate::threat::{DisabledFeed, ThreatFeed, UrlhausClient};

pub use scanner::Scanner;
pub use settings::ScanSettings;

/// Runs one scan of `config.url` with the production collaborators.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the scan fails
/// fatally (see [`Scanner::scan`]).
///
/// # Example
///
/// ```no_run
/// use redirect_detector::{run_scan, Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     url: "example.com".to_string(),
///     ..Default::default()
/// };
/// let report = run_scan(config).await?;
/// println!("{} -> {:?}", report.final_url, report.simple_analysis.phishing_verdict);
/// # Ok(())
/// # }
/// ```
pub async fn run_scan(config: Config) -> Result<RiskReport> {
    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let resolver = init_resolver();

    let threat_feed: Box<dyn ThreatFeed> = match config
        .threat_feed_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        Some(key) => Box::new(UrlhausClient::new(
            client.clone(),
            config.threat_feed_url.clone(),
            key,
        )),
        None => {
            info!("No threat feed key configured; threat lookup skipped");
            Box::new(DisabledFeed)
        }
    };

    let intel = ServerIntel {
        resolver,
        client,
        geo_endpoint: config.geo_endpoint.clone(),
    };

    let scanner = Scanner::new(
        ChromiumLauncher::new(),
        threat_feed,
        intel,
        ScanSettings::from(&config),
    );
    let report = scanner.scan(&config.url).await?;
    Ok(report)
}
