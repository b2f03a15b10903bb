// src/scan/report.rs
// =============================================================================
// This module holds the findings of one scan.
//
// The crawl fetches pages concurrently, so classification events arrive
// from several tasks at once. The report therefore wraps its state in a
// Mutex and only exposes three small atomic operations:
// - record_visit: bump the page counter
// - record_finding: insert a value into a named deduplicated list
// - set_flag: turn a named boolean on (it never turns off again)
//
// The lock is held for one operation at a time, never across I/O, so
// contention stays negligible.
//
// Rust concepts:
// - Interior mutability: &self methods that mutate through a Mutex
// - Enums as keys: Flag and Bucket name the fields without exposing them
// - serde Serialize: the snapshot doubles as the --json output
// =============================================================================

use serde::Serialize;
use std::sync::Mutex;

// The boolean findings a scan can produce
//
// Flags are monotonic: once set they stay set for the rest of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Google Analytics loaded via <script src>
    GoogleAnalyticsScriptSrc,
    /// Google Analytics URL seen inside inline <script> text
    GoogleAnalyticsInlineScript,
    /// Google Analytics loaded via <iframe>
    GoogleAnalyticsIframe,
    /// Google Fonts loaded via <link>
    GoogleFontsLink,
    /// Google Fonts URL seen inside inline <script> text
    GoogleFontsInlineScript,
    /// A <link rel="dns-prefetch"> element was seen
    DnsPrefetch,
}

// The deduplicated finding lists a scan can produce
//
// Each bucket preserves first-seen insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Google Fonts @import targets found in fetched css files
    GoogleFontsCss,
    /// Google Fonts @import targets found in inline <style> elements
    GoogleFontsStyle,
    /// Third-party <link> hrefs not matching a known provider
    OtherLinks,
    /// Third-party <script> srcs not matching a known provider
    OtherScripts,
    /// Third-party <iframe> srcs not matching a known provider
    OtherIframes,
    /// Third-party @import targets from fetched css files
    OtherCssImports,
    /// Third-party @import targets from inline <style> elements
    OtherStyleImports,
    /// Third-party <link rel="preconnect"> hrefs
    OtherPreconnect,
}

// The immutable view of a finished scan
//
// This is what gets rendered (and serialized for --json). During the
// crawl the same struct lives behind the report's Mutex; snapshot()
// clones it out once the crawl is done.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanSummary {
    /// How many URLs the crawler requested
    pub visits: u32,
    pub google_analytics_script_src: bool,
    pub google_analytics_inline_script: bool,
    pub google_analytics_iframe: bool,
    pub google_fonts_link: bool,
    pub google_fonts_inline_script: bool,
    pub dns_prefetch: bool,
    pub google_fonts_css: Vec<String>,
    pub google_fonts_style: Vec<String>,
    pub other_links: Vec<String>,
    pub other_scripts: Vec<String>,
    pub other_iframes: Vec<String>,
    pub other_css_imports: Vec<String>,
    pub other_style_imports: Vec<String>,
    pub other_preconnect: Vec<String>,
}

impl ScanSummary {
    // True when the scan turned up anything worth a non-zero exit code.
    //
    // dns-prefetch alone doesn't count: it hints at third parties but
    // names none, and the hinted hosts show up in the other buckets
    // anyway when they are actually used.
    pub fn has_findings(&self) -> bool {
        self.google_analytics_script_src
            || self.google_analytics_inline_script
            || self.google_analytics_iframe
            || self.google_fonts_link
            || self.google_fonts_inline_script
            || !self.google_fonts_css.is_empty()
            || !self.google_fonts_style.is_empty()
            || !self.other_links.is_empty()
            || !self.other_scripts.is_empty()
            || !self.other_iframes.is_empty()
            || !self.other_css_imports.is_empty()
            || !self.other_style_imports.is_empty()
            || !self.other_preconnect.is_empty()
    }
}

// The shared, concurrently-mutated findings of one running scan
#[derive(Debug, Default)]
pub struct Report {
    state: Mutex<ScanSummary>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    /// Counts one page visit and returns the new total
    pub fn record_visit(&self) -> u32 {
        let mut state = self.lock();
        state.visits += 1;
        state.visits
    }

    // Inserts a value into a bucket unless it's already there
    //
    // Returns true when the value was newly inserted. The duplicate scan
    // is linear, which is fine: buckets hold the distinct third-party
    // resources of one site, tens of entries at most.
    pub fn record_finding(&self, bucket: Bucket, value: &str) -> bool {
        let mut state = self.lock();
        let list = match bucket {
            Bucket::GoogleFontsCss => &mut state.google_fonts_css,
            Bucket::GoogleFontsStyle => &mut state.google_fonts_style,
            Bucket::OtherLinks => &mut state.other_links,
            Bucket::OtherScripts => &mut state.other_scripts,
            Bucket::OtherIframes => &mut state.other_iframes,
            Bucket::OtherCssImports => &mut state.other_css_imports,
            Bucket::OtherStyleImports => &mut state.other_style_imports,
            Bucket::OtherPreconnect => &mut state.other_preconnect,
        };
        if list.iter().any(|existing| existing == value) {
            return false;
        }
        list.push(value.to_string());
        true
    }

    /// Turns a flag on (idempotent - flags never turn off)
    pub fn set_flag(&self, flag: Flag) {
        let mut state = self.lock();
        match flag {
            Flag::GoogleAnalyticsScriptSrc => state.google_analytics_script_src = true,
            Flag::GoogleAnalyticsInlineScript => state.google_analytics_inline_script = true,
            Flag::GoogleAnalyticsIframe => state.google_analytics_iframe = true,
            Flag::GoogleFontsLink => state.google_fonts_link = true,
            Flag::GoogleFontsInlineScript => state.google_fonts_inline_script = true,
            Flag::DnsPrefetch => state.dns_prefetch = true,
        }
    }

    // Clones the current state out of the lock
    //
    // Meant to be called once, after the crawl has fully completed; the
    // returned summary is the frozen result of the scan.
    pub fn snapshot(&self) -> ScanSummary {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScanSummary> {
        // A poisoned lock means a handler panicked - a defect, not a
        // runtime condition we could recover from
        self.state.lock().expect("report lock poisoned")
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is interior mutability?
//    - The methods take &self (shared reference) but still mutate state
//    - The Mutex inside makes that safe: it hands out exclusive access
//      one caller at a time
//    - This is how several crawl tasks can share one report
//
// 2. Why std::sync::Mutex and not tokio's Mutex?
//    - The lock is only held for a few string comparisons, never across
//      an .await point
//    - For that pattern the std Mutex is the right tool (and the faster one)
//
// 3. Why enums for Flag and Bucket?
//    - Callers name a finding, they never touch the fields directly
//    - The match inside record_finding/set_flag is checked by the
//      compiler: add a variant and it forces you to route it
//
// 4. Why a Vec instead of a HashSet for the buckets?
//    - The report preserves first-seen order, which a HashSet throws away
//    - Buckets stay tiny (tens of entries), so the linear duplicate scan
//      costs nothing
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_counter_is_monotonic() {
        let report = Report::new();
        assert_eq!(report.record_visit(), 1);
        assert_eq!(report.record_visit(), 2);
        assert_eq!(report.snapshot().visits, 2);
    }

    #[test]
    fn test_duplicate_findings_are_dropped() {
        let report = Report::new();
        assert!(report.record_finding(Bucket::OtherLinks, "https://cdn.example.net/a.css"));
        assert!(!report.record_finding(Bucket::OtherLinks, "https://cdn.example.net/a.css"));
        assert_eq!(report.snapshot().other_links.len(), 1);
    }

    #[test]
    fn test_findings_keep_first_seen_order() {
        let report = Report::new();
        report.record_finding(Bucket::OtherScripts, "https://a.example/x.js");
        report.record_finding(Bucket::OtherScripts, "https://b.example/y.js");
        report.record_finding(Bucket::OtherScripts, "https://a.example/x.js");
        report.record_finding(Bucket::OtherScripts, "https://c.example/z.js");
        assert_eq!(
            report.snapshot().other_scripts,
            vec![
                "https://a.example/x.js",
                "https://b.example/y.js",
                "https://c.example/z.js",
            ]
        );
    }

    #[test]
    fn test_buckets_are_independent() {
        let report = Report::new();
        report.record_finding(Bucket::OtherLinks, "https://cdn.example.net/a");
        report.record_finding(Bucket::OtherPreconnect, "https://cdn.example.net/a");
        let summary = report.snapshot();
        assert_eq!(summary.other_links.len(), 1);
        assert_eq!(summary.other_preconnect.len(), 1);
    }

    #[test]
    fn test_flags_are_idempotent() {
        let report = Report::new();
        report.set_flag(Flag::GoogleFontsLink);
        report.set_flag(Flag::GoogleFontsLink);
        let summary = report.snapshot();
        assert!(summary.google_fonts_link);
        assert!(!summary.google_analytics_script_src);
    }

    #[test]
    fn test_empty_scan_has_no_findings() {
        let report = Report::new();
        report.record_visit();
        assert!(!report.snapshot().has_findings());
    }

    #[test]
    fn test_dns_prefetch_alone_is_not_a_finding() {
        let report = Report::new();
        report.set_flag(Flag::DnsPrefetch);
        assert!(!report.snapshot().has_findings());
    }

    #[test]
    fn test_concurrent_recording_is_safe() {
        use std::sync::Arc;

        let report = Arc::new(Report::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let report = Arc::clone(&report);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        report.record_visit();
                        report.record_finding(Bucket::OtherLinks, &format!("https://cdn{}.example.net", i));
                        report.set_flag(Flag::GoogleFontsLink);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = report.snapshot();
        assert_eq!(summary.visits, 400);
        // One entry per thread, each inserted 50 times
        assert_eq!(summary.other_links.len(), 8);
        assert!(summary.google_fonts_link);
    }
}
