//! Page analysis.
//!
//! Everything derived from the rendered page itself:
//! - Redirect chain reconstruction from the navigation's ancestry
//! - Outbound request observation and third-party domain extraction
//! - DOM deception signals (hidden iframes, overlays, cross-domain forms, links)
//! - Suspicious code patterns in the served markup
//! - Deep-link probing of a bounded sample of outbound links

pub mod content;
pub mod deep_links;
pub mod dom;
pub mod network;
pub mod redirects;

// Re-export public API
pub use content::scan_content;
pub use deep_links::{is_redirect, probe_links, select_links, DeepLinkResult};
pub use dom::{
    extract_dom_signals, BoxLocation, DomSignals, FormRisk, HiddenIframe, OutboundLink,
    OverlayRisk, StorageUsage,
};
pub use network::{is_external_host, NetworkObserver, NetworkSummary, RequestSample};
pub use redirects::{reconstruct_chain, HopStatus, RedirectHop};
