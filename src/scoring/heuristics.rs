//! Phishing heuristics over the landing URL and page text.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Words that phishing URLs lean on.
const URL_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "sign-in",
    "logon",
    "verify",
    "verification",
    "account",
    "update",
    "secure",
    "banking",
    "password",
    "wallet",
    "confirm",
    "billing",
    "invoice",
    "suspended",
    "unlock",
];

/// Top-level domains with a high share of abuse.
const RISKY_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "zip", "mov", "click", "country", "work",
    "rest", "cam", "icu",
];

/// Pressure-language families; each family counts once.
const URGENCY_FAMILIES: &[(&str, &str)] = &[
    (
        "urgency",
        r"\b(urgent|immediately|act now|right away|limited time|expires? (today|soon))\b",
    ),
    (
        "account threat",
        r"\b(account (has been |will be )?(suspended|locked|disabled|restricted|closed)|unusual (sign-in|activity)|unauthorized (access|activity))\b",
    ),
    (
        "verification demand",
        r"\b(verify your (account|identity)|confirm your (account|identity|password|details)|update your (payment|billing))\b",
    ),
    (
        "reward bait",
        r"\b(you('ve| have) won|claim your (prize|reward)|congratulations)\b",
    ),
];

static URGENCY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    URGENCY_FAMILIES
        .iter()
        .filter_map(|(family, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| log::error!("Invalid urgency pattern {family}: {e}"))
                .ok()
                .map(|regex| (*family, regex))
        })
        .collect()
});

/// The first suspicious keyword found in the URL, if any.
pub fn url_keyword(url: &str) -> Option<&'static str> {
    let lower = url.to_ascii_lowercase();
    URL_KEYWORDS.iter().copied().find(|kw| lower.contains(kw))
}

/// The host's TLD when it is on the high-risk list.
pub fn risky_tld(host: &str) -> Option<&'static str> {
    let tld = host.trim_end_matches('.').rsplit('.').next()?.to_ascii_lowercase();
    RISKY_TLDS.iter().copied().find(|risky| *risky == tld)
}

/// Pressure-language families present in `text`, in table order.
pub fn urgency_families(text: &str) -> Vec<&'static str> {
    URGENCY_PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(text))
        .map(|(family, _)| *family)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_keyword() {
        assert_eq!(url_keyword("https://paypa1.test/Login?next=/"), Some("login"));
        assert_eq!(url_keyword("https://example.com/docs"), None);
    }

    #[test]
    fn test_risky_tld() {
        assert_eq!(risky_tld("free-gift.TK"), Some("tk"));
        assert_eq!(risky_tld("prize.xyz."), Some("xyz"));
        assert_eq!(risky_tld("example.com"), None);
        assert_eq!(risky_tld("localhost"), None);
    }

    #[test]
    fn test_urgency_families() {
        let text = "URGENT: your account has been suspended. Verify your identity right away.";
        assert_eq!(
            urgency_families(text),
            vec!["urgency", "account threat", "verification demand"]
        );
        assert!(urgency_families("Welcome to our documentation").is_empty());
    }

    #[test]
    fn test_every_urgency_pattern_compiles() {
        assert_eq!(URGENCY_PATTERNS.len(), URGENCY_FAMILIES.len());
    }
}
