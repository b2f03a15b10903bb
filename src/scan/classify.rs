// src/scan/classify.rs
// =============================================================================
// This module is the classification engine - the piece that looks at every
// resource reference the crawler finds and decides what it is:
//
//   same-origin          -> ignored (it's the site's own resource)
//   known provider       -> a named flag or bucket (Google Fonts, Analytics)
//   other third-party    -> the "other" bucket for its element kind
//   dns-prefetch         -> informational flag, short-circuits everything
//   preconnect           -> its own bucket (if third-party)
//
// One Classifier exists per scan. The crawler invokes its on_* methods,
// possibly from several fetch tasks at once; every mutation goes through
// the report's atomic operations, so the methods take &self and need no
// locking of their own.
//
// Verbose tracing prints what was found on which page as it happens. It is
// purely a side effect - it never changes what gets classified.
// =============================================================================

use std::io::Write;
use std::sync::Arc;

use super::patterns::{CssImportScanner, Provider};
use super::report::{Bucket, Flag, Report};
use super::target::ScanTarget;

// Classifies crawl events into report findings
pub struct Classifier {
    target: ScanTarget,
    imports: CssImportScanner,
    report: Arc<Report>,
    verbose: bool,
}

impl Classifier {
    // Builds the classifier for one scan
    //
    // Compiles the CSS @import grammar up front: a pattern that fails to
    // compile is a programming defect and panics here, at startup, never
    // mid-crawl.
    pub fn new(target: ScanTarget, report: Arc<Report>, verbose: bool) -> Self {
        Classifier {
            target,
            imports: CssImportScanner::new(),
            report,
            verbose,
        }
    }

    /// The target this classifier resolves origins against
    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    // Called for every URL the crawler requests
    //
    // Bumps the visit counter. In verbose mode each visit gets its own
    // line; otherwise a single progress line is rewritten in place.
    pub fn on_visit(&self, page_url: &str) {
        let count = self.report.record_visit();
        if self.verbose {
            println!("VISITING: {}", page_url);
        } else {
            // \x1b[2K erases the line, \r returns to column 0
            print!("\x1b[2K\r{} pages visited", count);
            let _ = std::io::stdout().flush();
        }
    }

    // Called for every <link href> element
    //
    // Order matters:
    // 1. rel="dns-prefetch" wins outright - the href is never also
    //    counted as a third-party or provider resource
    // 2. rel="preconnect" to a third party goes to its own bucket
    // 3. a Google Fonts href sets the flag
    // 4. any other third-party href goes to the "other links" bucket
    pub fn on_link(&self, page_url: &str, href: &str, rel: &str, id: &str) {
        let third_party = !self.target.is_same_origin(href);

        if rel == "dns-prefetch" {
            self.report.set_flag(Flag::DnsPrefetch);
            if self.verbose {
                println!("DNS-PREFETCH on {}: {}, rel: {}, id: {}", page_url, href, rel, id);
            }
            return;
        }

        if rel == "preconnect" && third_party {
            self.report.record_finding(Bucket::OtherPreconnect, href);
            if self.verbose {
                println!("LINK / PRECONNECT on {}: {}, rel: {}, id: {}", page_url, href, rel, id);
            }
            return;
        }

        if Provider::GoogleFonts.matches(href) {
            self.report.set_flag(Flag::GoogleFontsLink);
            if self.verbose {
                println!("LINK / GOOGLEFONT on {}: {}, rel: {}, id: {}", page_url, href, rel, id);
            }
            return;
        }

        if third_party {
            self.report.record_finding(Bucket::OtherLinks, href);
            if self.verbose {
                println!("3RD PARTY LINK on {}: {}, rel: {}, id: {}", page_url, href, rel, id);
            }
        }
    }

    // Called for every <script> element
    //
    // A sourced script is judged by its src URL; an inline script is
    // judged by its text. A script can have a same-origin src AND
    // interesting text, so the text checks still run when the src checks
    // found nothing.
    pub fn on_script(&self, page_url: &str, src: Option<&str>, text: &str) {
        if let Some(src) = src.filter(|s| !s.is_empty()) {
            if Provider::GoogleAnalytics.matches(src) {
                self.report.set_flag(Flag::GoogleAnalyticsScriptSrc);
                if self.verbose {
                    println!("GOOGLE ANALYTICS <script> sourced on {}: {}", page_url, src);
                }
                return;
            }
            if !self.target.is_same_origin(src) {
                self.report.record_finding(Bucket::OtherScripts, src);
                if self.verbose {
                    println!("3RD PARTY <script> sourced on {}: {}", page_url, src);
                }
                return;
            }
        }

        // A URL in script text only proves the URL is present in the
        // markup, not that the code ever runs - the rendering points
        // that out to the user.
        if Provider::GoogleFonts.matches_inline_script(text) {
            self.report.set_flag(Flag::GoogleFontsInlineScript);
            if self.verbose {
                println!(
                    "GOOGLE FONTS URL found in <script> on {} (unknown if that code is executed)",
                    page_url
                );
            }
            return;
        }
        if Provider::GoogleAnalytics.matches_inline_script(text) {
            self.report.set_flag(Flag::GoogleAnalyticsInlineScript);
            if self.verbose {
                println!(
                    "GOOGLE ANALYTICS URL found in <script> on {} (unknown if that code is executed)",
                    page_url
                );
            }
        }
    }

    /// Called for every <iframe src> element
    pub fn on_iframe(&self, page_url: &str, src: &str) {
        if src.is_empty() {
            return;
        }
        if Provider::GoogleAnalytics.matches(src) {
            self.report.set_flag(Flag::GoogleAnalyticsIframe);
            if self.verbose {
                println!("GOOGLE ANALYTICS <iframe> sourced on {}: {}", page_url, src);
            }
            return;
        }
        if !self.target.is_same_origin(src) {
            self.report.record_finding(Bucket::OtherIframes, src);
            if self.verbose {
                println!("3RD PARTY <iframe> sourced on {}: {}", page_url, src);
            }
        }
    }

    // Called for every inline <style> element
    //
    // Runs the @import scanner over the style text, then classifies each
    // import target on its own.
    pub fn on_style(&self, page_url: &str, css: &str) {
        for import in self.imports.extract(css) {
            if Provider::GoogleFonts.matches(import) {
                self.report.record_finding(Bucket::GoogleFontsStyle, import);
                if self.verbose {
                    println!("STYLE / GOOGLEFONT @import in {}: {}", page_url, import);
                }
                continue;
            }
            if !self.target.is_same_origin(import) {
                self.report.record_finding(Bucket::OtherStyleImports, import);
                if self.verbose {
                    println!("3RD PARTY @import in <style> {}: {}", page_url, import);
                }
            }
        }
    }

    // Called for every fetched stylesheet body
    //
    // Same routing as on_style, but findings land in the css-file buckets
    // so the report can say where an import was found.
    pub fn on_css_response(&self, css_url: &str, body: &str) {
        for import in self.imports.extract(body) {
            if Provider::GoogleFonts.matches(import) {
                self.report.record_finding(Bucket::GoogleFontsCss, import);
                if self.verbose {
                    println!("CSS / GOOGLEFONT @import in {}: {}", css_url, import);
                }
                continue;
            }
            if !self.target.is_same_origin(import) {
                self.report.record_finding(Bucket::OtherCssImports, import);
                if self.verbose {
                    println!("3RD PARTY @import in css file {}: {}", css_url, import);
                }
            }
        }
    }
}
