//! Suspicious code patterns in raw page markup.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Named patterns, matched case-insensitively against the served markup.
const PATTERN_TABLE: &[(&str, &str)] = &[
    ("eval()", r"\beval\s*\("),
    ("document.write", r"\bdocument\.write(ln)?\s*\("),
    ("atob", r"\batob\s*\("),
    ("String.fromCharCode", r"\bString\.fromCharCode\s*\("),
    ("unescape", r"\bunescape\s*\("),
    (
        "crypto-mining",
        r"coinhive|coin-hive|cryptonight|webminer|cryptoloot|miner\.start\s*\(",
    ),
    ("x-frame-options", r"x-frame-options"),
];

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PATTERN_TABLE
        .iter()
        .filter_map(|(name, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| log::error!("Invalid content pattern {name}: {e}"))
                .ok()
                .map(|regex| (*name, regex))
        })
        .collect()
});

/// Scans markup for the pattern table.
///
/// Each pattern is reported at most once, in table order, however many times
/// it matches.
pub fn scan_content(markup: &str) -> Vec<String> {
    PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(markup))
        .map(|(name, _)| (*name).to_string())
        .collect()
}
