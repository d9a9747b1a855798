//! The scan pipeline.
//!
//! One scan owns one browser session from launch to close:
//! 1. The primary page is loaded and inspected sequentially (navigation,
//!    redirect chain, DOM signals, markup, screenshot), then closed.
//! 2. Deep-link probes, server intelligence and the threat lookup run
//!    concurrently; none depends on another.
//! 3. Signals are scored and the report is assembled.
//!
//! Only a failed launch, a page that cannot open, or a failed primary
//! navigation abort the scan. Every other failure degrades its own section.

use std::time::{Duration, Instant};

use base64::prelude::{Engine as _, BASE64_STANDARD};
use log::{error, info, warn};

use super::settings::ScanSettings;
use crate::analysis::{
    extract_dom_signals, probe_links, reconstruct_chain, scan_content, DeepLinkResult, DomSignals,
    NetworkObserver, NetworkSummary, RedirectHop,
};
use crate::app::{host_of, normalize_target_url};
use crate::browser::{
    BrowserLauncher, BrowserPage, BrowserSession, NavigationResponse, ScreenshotFormat, WaitPolicy,
};
use crate::config::{SCREENSHOT_QUALITY, THREAT_TIMEOUT_SECS};
use crate::error_handling::{BrowserError, PartialFailures, ScanError, Section};
use crate::report::{
    missing_recommended_headers, security_headers, RiskReport, SecurityScan, SimpleAnalysis,
};
use crate::scoring::{assess, ScoringInput};
use crate::server_info::ServerIntel;
use crate::threat::{ThreatFeed, ThreatVerdict};

/// What the primary page yielded before it was closed.
struct PrimaryPage {
    final_url: String,
    response: Option<NavigationResponse>,
    redirect_chain: Vec<RedirectHop>,
    dom: DomSignals,
    markup: String,
    suspicious_patterns: Vec<String>,
    screenshot: Option<String>,
    network: NetworkSummary,
}

/// Runs scans against injected collaborators.
pub struct Scanner<L, T> {
    launcher: L,
    threat_feed: T,
    intel: ServerIntel,
    settings: ScanSettings,
}

impl<L, T> Scanner<L, T>
where
    L: BrowserLauncher,
    T: ThreatFeed,
{
    pub fn new(launcher: L, threat_feed: T, intel: ServerIntel, settings: ScanSettings) -> Self {
        Self {
            launcher,
            threat_feed,
            intel,
            settings,
        }
    }

    /// Scans one target URL.
    ///
    /// `http://` is prepended when the target has no scheme.
    ///
    /// # Errors
    ///
    /// Returns a `ScanError` when the target is not a usable URL, the browser
    /// cannot launch, the primary page cannot open, or the primary navigation
    /// fails or exceeds its timeout. The browser session is closed on every path.
    pub async fn scan(&self, target: &str) -> Result<RiskReport, ScanError> {
        let url = normalize_target_url(target)?;
        let started = Instant::now();
        info!("Scanning {url}");

        let session = self
            .launcher
            .launch(&self.settings.launch)
            .await
            .map_err(ScanError::BrowserLaunch)?;

        let result = self.scan_in_session(&session, &url).await;

        if let Err(e) = session.close().await {
            warn!("Closing browser session failed: {e}");
        }

        match &result {
            Ok(report) => info!(
                "Scan of {url} finished in {:.1}s: landed on {}, {} degraded section(s)",
                started.elapsed().as_secs_f64(),
                report.final_url,
                report.partial_failures.len()
            ),
            Err(e) => error!("Scan of {url} failed: {e}"),
        }
        result
    }

    async fn scan_in_session(
        &self,
        session: &L::Session,
        url: &str,
    ) -> Result<RiskReport, ScanError> {
        let failures = PartialFailures::new();

        let budget = self.settings.navigation_timeout;
        let page = match tokio::time::timeout(budget, session.new_page()).await {
            Ok(opened) => opened.map_err(ScanError::PageOpen)?,
            Err(_) => return Err(ScanError::PageOpen(BrowserError::Timeout(budget))),
        };
        let primary = self.inspect_primary(&page, url, &failures).await;
        if let Err(e) = page.close().await {
            failures.record(Section::PageClose, e.to_string());
        }
        let primary = primary?;

        let (deep_scan_results, server_info, threat_intel) = tokio::join!(
            self.probe_deep_links(session, &primary.dom, &failures),
            self.intel.gather(&primary.final_url, &failures),
            self.lookup_threat(&primary.final_url, &failures),
        );

        let headers = security_headers(primary.response.as_ref());
        let assessment = assess(&ScoringInput {
            requested_url: url,
            final_url: &primary.final_url,
            redirect_hops: primary.redirect_chain.len().saturating_sub(1),
            missing_headers: missing_recommended_headers(&headers),
            hidden_iframes: primary.dom.hidden_iframes.len(),
            overlay_risks: primary.dom.overlay_risks.len(),
            cross_domain_forms: primary.dom.cross_domain_forms.len(),
            suspicious_patterns: &primary.suspicious_patterns,
            external_domains: primary.network.external_domains.len(),
            certificate_error: server_info.has_certificate_error(),
            page_text: &primary.markup,
            deep_links_probed: deep_scan_results.len(),
            deep_links_redirected: deep_scan_results
                .iter()
                .filter(|r| r.redirected == Some(true))
                .count(),
            malicious: threat_intel.malicious,
            threat_tags: threat_intel.tags.iter().map(String::as_str).collect(),
        });

        Ok(RiskReport {
            final_url: primary.final_url,
            redirect_chain: primary.redirect_chain,
            hidden_iframes: primary.dom.hidden_iframes,
            clickjacking_risks: primary.dom.overlay_risks,
            form_risks: primary.dom.cross_domain_forms,
            deep_scan_results,
            network_summary: primary.network,
            security_scan: SecurityScan {
                risk_score: assessment.risk_score,
                verdict: assessment.verdict,
                suspicious_patterns: primary.suspicious_patterns,
                storage_usage: primary.dom.storage,
                headers,
                screenshot: primary.screenshot,
            },
            server_info,
            simple_analysis: SimpleAnalysis {
                summary: assessment.summary,
                phishing_score: assessment.phishing_score,
                phishing_verdict: assessment.phishing_verdict,
            },
            threat_intel,
            partial_failures: failures.take(),
        })
    }

    async fn inspect_primary<P>(
        &self,
        page: &P,
        url: &str,
        failures: &PartialFailures,
    ) -> Result<PrimaryPage, ScanError>
    where
        P: BrowserPage,
    {
        let observer = NetworkObserver::new(url);
        if let Err(e) = page.on_request(observer.handler()).await {
            failures.record(Section::RequestCapture, e.to_string());
        }

        let response = page
            .goto(url, WaitPolicy::NetworkIdle, self.settings.navigation_timeout)
            .await
            .map_err(|source| ScanError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let final_url = match page.url().await {
            Ok(final_url) => final_url,
            Err(e) => {
                let fallback = response
                    .as_ref()
                    .map(|r| r.url.clone())
                    .unwrap_or_else(|| url.to_string());
                warn!("Reading the landing URL failed ({e}); using {fallback}");
                fallback
            }
        };
        let redirect_chain = reconstruct_chain(response.as_ref(), url, &final_url);

        let dom = match extract_dom_signals(page).await {
            Ok(dom) => dom,
            Err(e) => {
                failures.record(Section::DomInspection, e.to_string());
                DomSignals::default()
            }
        };

        let markup = match page.content().await {
            Ok(markup) => markup,
            Err(e) => {
                failures.record(Section::ContentFetch, e.to_string());
                String::new()
            }
        };
        let suspicious_patterns = scan_content(&markup);

        let screenshot = if self.settings.screenshot {
            match page.screenshot(ScreenshotFormat::Jpeg, SCREENSHOT_QUALITY).await {
                Ok(bytes) => Some(BASE64_STANDARD.encode(bytes)),
                Err(e) => {
                    failures.record(Section::Screenshot, e.to_string());
                    None
                }
            }
        } else {
            None
        };

        Ok(PrimaryPage {
            final_url,
            response,
            redirect_chain,
            dom,
            markup,
            suspicious_patterns,
            screenshot,
            network: observer.summary(),
        })
    }

    async fn probe_deep_links(
        &self,
        session: &L::Session,
        dom: &DomSignals,
        failures: &PartialFailures,
    ) -> Vec<DeepLinkResult> {
        let results = probe_links(
            session,
            &dom.links,
            self.settings.deep_link_limit,
            self.settings.deep_link_concurrency,
            self.settings.probe_timeout,
        )
        .await;
        for result in results.iter() {
            if let Some(error) = &result.error {
                failures.record(
                    Section::DeepLinkProbe,
                    format!("{}: {error}", result.original_url),
                );
            }
        }
        results
    }

    async fn lookup_threat(&self, final_url: &str, failures: &PartialFailures) -> ThreatVerdict {
        let Some(host) = host_of(final_url) else {
            return ThreatVerdict::unknown();
        };
        let budget = Duration::from_secs(THREAT_TIMEOUT_SECS);
        match tokio::time::timeout(budget, self.threat_feed.lookup(&host)).await {
            Ok(Ok(verdict)) => {
                if verdict.malicious {
                    warn!("Threat feed lists {host} as malicious");
                }
                verdict
            }
            Ok(Err(e)) => {
                failures.record(Section::ThreatLookup, format!("{host}: {e}"));
                ThreatVerdict::unknown()
            }
            Err(_) => {
                failures.record(
                    Section::ThreatLookup,
                    format!("{host}: timed out after {}s", budget.as_secs()),
                );
                ThreatVerdict::unknown()
            }
        }
    }
}
