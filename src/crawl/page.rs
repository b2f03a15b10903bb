// src/crawl/page.rs
// =============================================================================
// This module processes one fetched HTML page:
//
// 1. Fires a classification event for every element of interest
//    (<link>, <script>, <iframe>, <style>)
// 2. Collects the URLs the crawler should follow next (<a href> and
//    <link href>, restricted to the scanned host)
//
// The classifier always receives the RAW attribute value, exactly as it
// appears in the markup - that's what the same-origin rules are written
// against. Only the follow candidates get resolved to absolute URLs,
// because the fetcher needs something it can request.
//
// Rust concepts:
// - scraper: CSS selectors over a parsed DOM
// - Iterators and Option chaining for attribute handling
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use crate::scan::Classifier;

// Fires classification events for a page and returns follow candidates
//
// Parameters:
//   classifier: the scan's classification engine
//   page_url: the URL this HTML was fetched from
//   html: the raw page body
//
// Returns: absolute same-host URLs worth visiting next (not yet
// deduplicated against the visited set - the queue owns that)
pub fn scan_page(classifier: &Classifier, page_url: &str, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // Constant selectors - a parse failure here is a programming defect
    let link_selector = Selector::parse("link[href]").unwrap();
    let script_selector = Selector::parse("script").unwrap();
    let iframe_selector = Selector::parse("iframe[src]").unwrap();
    let style_selector = Selector::parse("style").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();

    for element in document.select(&link_selector) {
        let href = element.value().attr("href").unwrap_or("");
        let rel = element.value().attr("rel").unwrap_or("");
        let id = element.value().attr("id").unwrap_or("");
        classifier.on_link(page_url, href, rel, id);
    }

    for element in document.select(&script_selector) {
        let src = element.value().attr("src");
        let text: String = element.text().collect();
        classifier.on_script(page_url, src, &text);
    }

    for element in document.select(&iframe_selector) {
        let src = element.value().attr("src").unwrap_or("");
        classifier.on_iframe(page_url, src);
    }

    for element in document.select(&style_selector) {
        let text: String = element.text().collect();
        classifier.on_style(page_url, &text);
    }

    // Follow candidates: page links plus <link> targets, so same-origin
    // stylesheets get fetched and their @imports scanned too
    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => {
            // Without a parseable base we can't resolve anything relative;
            // the events above still counted, we just can't follow links
            eprintln!("Warning: invalid page URL, not following links: {}", page_url);
            return Vec::new();
        }
    };

    let mut follows = Vec::new();
    for selector in [&anchor_selector, &link_selector] {
        for element in document.select(selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_follow(&base, href, classifier.target().host()) {
                    follows.push(absolute);
                }
            }
        }
    }

    follows
}

// Resolves a href into an absolute URL the crawler may visit
//
// Returns None for fragments, non-web schemes, URLs that don't resolve,
// and anything on a different host - the crawl never leaves the site.
fn resolve_follow(base: &Url, href: &str, host: &str) -> Option<String> {
    // Skip anchors and special protocols
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if resolved.host_str() != Some(host) {
        return None;
    }

    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{Report, ScanTarget};
    use std::sync::Arc;

    fn classifier() -> (Classifier, Arc<Report>) {
        let target = ScanTarget::parse("http://example.com").unwrap();
        let report = Arc::new(Report::new());
        (Classifier::new(target, Arc::clone(&report), false), report)
    }

    #[test]
    fn test_scan_page_fires_element_events() {
        let (classifier, report) = classifier();
        let html = r#"
            <html><head>
                <link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Lato">
                <link rel="dns-prefetch" href="//cdn.example.net">
                <style>@import url('https://cdn.example.net/theme.css');</style>
            </head><body>
                <script src="https://www.googletagmanager.com/gtag/js"></script>
                <iframe src="https://video.example.org/embed/1"></iframe>
            </body></html>
        "#;
        scan_page(&classifier, "http://example.com", html);

        let summary = report.snapshot();
        assert!(summary.google_fonts_link);
        assert!(summary.dns_prefetch);
        assert!(summary.google_analytics_script_src);
        assert_eq!(summary.other_style_imports, vec!["https://cdn.example.net/theme.css"]);
        assert_eq!(summary.other_iframes, vec!["https://video.example.org/embed/1"]);
    }

    #[test]
    fn test_follow_candidates_stay_on_host() {
        let (classifier, _report) = classifier();
        let html = r#"
            <a href="/about">About</a>
            <a href="contact.html">Contact</a>
            <a href="https://other.com/page">Elsewhere</a>
            <a href="mailto:hi@example.com">Mail</a>
            <link rel="stylesheet" href="/main.css">
        "#;
        let follows = scan_page(&classifier, "http://example.com/", html);
        assert_eq!(
            follows,
            vec![
                "http://example.com/about",
                "http://example.com/contact.html",
                "http://example.com/main.css",
            ]
        );
    }

    #[test]
    fn test_resolve_follow_rules() {
        let base = Url::parse("http://example.com/page/").unwrap();
        assert_eq!(
            resolve_follow(&base, "/docs", "example.com"),
            Some("http://example.com/docs".to_string())
        );
        assert_eq!(
            resolve_follow(&base, "next.html", "example.com"),
            Some("http://example.com/page/next.html".to_string())
        );
        assert_eq!(resolve_follow(&base, "#section", "example.com"), None);
        assert_eq!(resolve_follow(&base, "javascript:void(0)", "example.com"), None);
        assert_eq!(resolve_follow(&base, "https://other.com/x", "example.com"), None);
    }
}
