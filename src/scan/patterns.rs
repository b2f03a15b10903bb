// src/scan/patterns.rs
// =============================================================================
// This module contains the pattern matching pieces of the scanner:
//
// - CssImportScanner: pulls @import targets out of raw CSS text
// - Provider: the table of known external services and their URL markers
//
// Why a marker table instead of if/else chains?
// - Adding a provider means adding a table row, not touching the
//   classification algorithm
// - The same table serves every element kind
//
// Rust concepts:
// - Enums with methods: Provider knows its own markers
// - 'static slices: Marker lists live in the binary, no allocation
// - Lifetimes: extract() borrows from the CSS text it was given
// =============================================================================

use regex::Regex;

// The tolerant @import grammar.
//
// CSS authors write imports in many shapes:
//   @import url('https://fonts.googleapis.com/css?family=Roboto');
//   @import "a.css";
//   @import url(b.css);
// The grammar accepts all of them: optional url() wrapper, optional
// quotes (single or double), arbitrary whitespace. Capture group 1 is
// the import target.
const CSS_IMPORT_GRAMMAR: &str = r#"@import\W?(?:url)?\(?['"]?([^)'"]*)['"]?\)?"#;

// Extracts @import targets from CSS text
//
// Holds the compiled grammar so one scanner can be reused across every
// stylesheet and <style> element of a scan.
#[derive(Debug)]
pub struct CssImportScanner {
    pattern: Regex,
}

impl CssImportScanner {
    // Compiles the @import grammar
    //
    // The grammar is a constant, so a compile failure is a programming
    // defect - we panic at startup rather than mid-scan.
    pub fn new() -> Self {
        CssImportScanner {
            pattern: Regex::new(CSS_IMPORT_GRAMMAR)
                .expect("css @import grammar failed to compile"),
        }
    }

    // Yields the target of each @import in source order
    //
    // The iterator is lazy and borrows from `css`; calling extract again
    // restarts from the top (no state is kept between calls).
    //
    // Example:
    //   extract("@import \"a.css\"; @import url(b.css);")
    //   yields "a.css", then "b.css"
    pub fn extract<'a>(&'a self, css: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .captures_iter(css)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl Default for CssImportScanner {
    fn default() -> Self {
        Self::new()
    }
}

// The external services we know how to recognize
//
// Each provider is detected by substring markers in URLs or script text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Fonts (font delivery - leaks visitor IPs to Google)
    GoogleFonts,
    /// Google Analytics / Tag Manager (visitor tracking)
    GoogleAnalytics,
}

impl Provider {
    // Markers checked against URL-valued references:
    // link hrefs, script/iframe srcs, and CSS @import targets
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Provider::GoogleFonts => &["fonts.googleapis.com", "fonts.gstatic.com"],
            Provider::GoogleAnalytics => &["googletagmanager.com"],
        }
    }

    // Markers checked against inline <script> text.
    //
    // For Google Fonts only the stylesheet host counts here: gstatic
    // URLs inside script text are almost always font file preloads that
    // the <link> detection already covers.
    pub fn inline_script_markers(self) -> &'static [&'static str] {
        match self {
            Provider::GoogleFonts => &["fonts.googleapis.com"],
            Provider::GoogleAnalytics => &["googletagmanager.com"],
        }
    }

    /// Does this URL-valued reference point at the provider?
    pub fn matches(self, reference: &str) -> bool {
        self.markers().iter().any(|marker| reference.contains(marker))
    }

    /// Does this inline script text mention the provider?
    pub fn matches_inline_script(self, text: &str) -> bool {
        self.inline_script_markers()
            .iter()
            .any(|marker| text.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url_with_quotes() {
        let scanner = CssImportScanner::new();
        let css = "@import url('https://fonts.googleapis.com/css?family=Roboto');";
        let targets: Vec<&str> = scanner.extract(css).collect();
        assert_eq!(targets, vec!["https://fonts.googleapis.com/css?family=Roboto"]);
    }

    #[test]
    fn test_extract_mixed_forms_in_order() {
        let scanner = CssImportScanner::new();
        let css = r#"@import "a.css"; @import url(b.css);"#;
        let targets: Vec<&str> = scanner.extract(css).collect();
        assert_eq!(targets, vec!["a.css", "b.css"]);
    }

    #[test]
    fn test_extract_nothing_from_plain_css() {
        let scanner = CssImportScanner::new();
        let css = "body { margin: 0; } /* no imports here */";
        assert_eq!(scanner.extract(css).count(), 0);
    }

    #[test]
    fn test_extract_survives_odd_whitespace() {
        let scanner = CssImportScanner::new();
        let css = "@import\turl(\"x.css\")  ;\n   @import 'y.css';";
        let targets: Vec<&str> = scanner.extract(css).collect();
        assert_eq!(targets, vec!["x.css", "y.css"]);
    }

    #[test]
    fn test_extract_is_restartable() {
        let scanner = CssImportScanner::new();
        let css = "@import url(a.css);";
        assert_eq!(scanner.extract(css).count(), 1);
        // A second pass over the same text sees the same imports
        assert_eq!(scanner.extract(css).count(), 1);
    }

    #[test]
    fn test_google_fonts_markers() {
        assert!(Provider::GoogleFonts.matches("https://fonts.googleapis.com/css?family=Lato"));
        assert!(Provider::GoogleFonts.matches("https://fonts.gstatic.com/s/lato/v24/x.woff2"));
        assert!(!Provider::GoogleFonts.matches("https://example.com/fonts/lato.woff2"));
    }

    #[test]
    fn test_google_analytics_markers() {
        assert!(Provider::GoogleAnalytics.matches("https://www.googletagmanager.com/gtag/js"));
        assert!(!Provider::GoogleAnalytics.matches("https://example.com/analytics.js"));
    }

    #[test]
    fn test_inline_script_markers_are_narrower_for_fonts() {
        let text = "var u = 'https://fonts.gstatic.com/s/x.woff2';";
        assert!(!Provider::GoogleFonts.matches_inline_script(text));
        let text = "loadCss('https://fonts.googleapis.com/css?family=Lato');";
        assert!(Provider::GoogleFonts.matches_inline_script(text));
    }
}
