// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Cleanup of text extracted from HTML pages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace, punctuation and decorative symbols that scraped pages
/// use as visual separators. Each run collapses to one space.
static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\s|*_(),;#%\x{2014}\x{2013}\x{00D7}\x{00A9}\x{00AE}\x{00B7}\x{2022}\x{2582}\x{2715}\x{FE0F}\x{1F553}\x{1F573}\x{1F3CD}-]+",
    )
    .expect("separator pattern is valid")
});

/// Collapse separator runs to single spaces and trim the ends.
///
/// Idempotent: the output contains no separator run longer than one space and
/// no leading or trailing space, so normalizing it again changes nothing.
pub fn normalize_text(raw: &str) -> String {
    SEPARATOR_RUN.replace_all(raw, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_text("Hello   world"), "Hello world");
        assert_eq!(normalize_text("Hello\n\t world"), "Hello world");
    }

    #[test]
    fn test_trims_ends() {
        assert_eq!(normalize_text("  padded  "), "padded");
    }

    #[test]
    fn test_replaces_punctuation_separators() {
        assert_eq!(normalize_text("one, two; three"), "one two three");
        assert_eq!(normalize_text("(aside)"), "aside");
        assert_eq!(normalize_text("snake_case_name"), "snake case name");
        assert_eq!(normalize_text("50% off #deals"), "50 off deals");
    }

    #[test]
    fn test_replaces_decorative_symbols() {
        assert_eq!(normalize_text("Home • About • Blog"), "Home About Blog");
        assert_eq!(normalize_text("2020–2024 — all rights"), "2020 2024 all rights");
        assert_eq!(normalize_text("© ACME®"), "ACME");
        assert_eq!(normalize_text("close ✕"), "close");
        assert_eq!(normalize_text("3×4"), "3 4");
    }

    #[test]
    fn test_keeps_ordinary_text() {
        assert_eq!(normalize_text("Привет мир"), "Привет мир");
        assert_eq!(normalize_text("v1.2 is out!"), "v1.2 is out!");
    }

    #[test]
    fn test_empty_and_separator_only_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" - | * - "), "");
    }

    #[test]
    fn test_is_idempotent() {
        let samples = [
            "Hello   world",
            "  a, b; (c) — d • e  ",
            "already clean text",
            "trailing dash -",
            "©®·",
            "mixed\u{00A0}nbsp",
        ];

        for sample in samples {
            let once = normalize_text(sample);
            let twice = normalize_text(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
