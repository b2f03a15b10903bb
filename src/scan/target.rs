// src/scan/target.rs
// =============================================================================
// This module defines the scan target and the same-origin check.
//
// The scan target is the website we were asked to scan. From the raw URL
// we derive everything the rest of the scanner needs:
// - the host (for restricting the crawl and for protocol-relative checks)
// - the base origin "scheme://host[:port]" (for absolute-URL prefix checks)
//
// The same-origin check is the heart of third-party detection: every
// resource reference found in the markup is either "ours" (same origin)
// or "theirs" (third party).
//
// Rust concepts:
// - Struct with private fields + accessor methods (immutable after parse)
// - Result<T, E>: For operations that can fail
// - Regex: Compiled once at construction, reused per check
// =============================================================================

use anyhow::{anyhow, bail, Result};
use regex::Regex;
use url::Url;

// The grammar for "local path" references.
//
// A reference like "/about", "contact.html?x=1" or "#section" never leaves
// the site, so it counts as same-origin without looking at the host at all.
//
// Note the character set: path segments are limited to [A-Za-z0-9-_.].
// Relative paths containing other characters (spaces, percent-escapes,
// unicode segments) do NOT match and fall through to the third-party
// verdict. That is deliberately conservative - we'd rather over-report a
// weird-looking reference than silently trust it.
const LOCAL_PATH_GRAMMAR: &str = r"^(/?[A-Za-z0-9_.-]+)*([#?].*)?$";

// Represents the website being scanned
//
// Constructed once per scan via ScanTarget::parse and never mutated.
#[derive(Debug, Clone)]
pub struct ScanTarget {
    /// The URL string exactly as the user typed it
    raw: String,
    /// The parsed (and possibly scheme-defaulted) seed URL
    url: Url,
    /// The host part, e.g. "example.com"
    host: String,
    /// "scheme://host" plus ":port" when one was given explicitly
    base_origin: String,
    /// Compiled local-path grammar (see LOCAL_PATH_GRAMMAR)
    local_path: Regex,
}

impl ScanTarget {
    // Parses a user-supplied URL into a scan target
    //
    // A URL without a scheme gets "https://" prepended (so "example.com"
    // works on the command line). Schemes other than http/https are
    // rejected - we can only crawl the web.
    //
    // Returns: Ok(ScanTarget) or Err with a message suitable for the user
    pub fn parse(raw: &str) -> Result<Self> {
        // Try to parse as-is; retry with an https:// prefix if the string
        // had no scheme at all
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{}", raw))
                    .map_err(|e| anyhow!("Invalid URL '{}': {}", raw, e))?
            }
            Err(e) => return Err(anyhow!("Invalid URL '{}': {}", raw, e)),
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("Unsupported scheme '{}' in '{}': only http and https can be scanned", url.scheme(), raw);
        }

        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host: {}", raw))?
            .to_string();

        // Build "scheme://host" and append ":port" only when the URL named
        // one explicitly (Url::port() is None for scheme defaults)
        let mut base_origin = format!("{}://{}", url.scheme(), host);
        if let Some(port) = url.port() {
            base_origin.push_str(&format!(":{}", port));
        }

        // The grammar is a constant, so a compile failure is a programming
        // defect - panic at startup rather than at scan time
        let local_path = Regex::new(LOCAL_PATH_GRAMMAR)
            .expect("local-path grammar failed to compile");

        Ok(ScanTarget {
            raw: raw.to_string(),
            url,
            host,
            base_origin,
            local_path,
        })
    }

    /// The URL string exactly as given on the command line
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed seed URL the crawl starts from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The scheme of the seed URL ("http" or "https")
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The host the crawl is restricted to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The explicit port of the seed URL, if one was given
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// "scheme://host[:port]" of the seed URL
    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    // Decides whether a resource reference stays on this site
    //
    // Rules, first match wins:
    // 1. The reference is a local path ("/about", "contact.html?x=1",
    //    "#section", "?page=2", ...)
    // 2. The reference is protocol-relative to our host ("//example.com/x")
    // 3. The reference starts with our base origin ("https://example.com/x")
    // 4. The reference is the literal "about:blank"
    //
    // Anything else is third-party.
    pub fn is_same_origin(&self, reference: &str) -> bool {
        if self.local_path.is_match(reference) {
            return true;
        }
        if let Some(rest) = reference.strip_prefix("//") {
            if rest.starts_with(&self.host) {
                return true;
            }
        }
        if reference.starts_with(&self.base_origin) {
            return true;
        }
        if reference == "about:blank" {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(raw: &str) -> ScanTarget {
        ScanTarget::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_derives_base_origin() {
        let t = target("http://example.com/start");
        assert_eq!(t.scheme(), "http");
        assert_eq!(t.host(), "example.com");
        assert_eq!(t.port(), None);
        assert_eq!(t.base_origin(), "http://example.com");
    }

    #[test]
    fn test_parse_keeps_explicit_port() {
        let t = target("http://example.com:8080/start");
        assert_eq!(t.port(), Some(8080));
        assert_eq!(t.base_origin(), "http://example.com:8080");
    }

    #[test]
    fn test_parse_defaults_missing_scheme_to_https() {
        let t = target("example.com");
        assert_eq!(t.scheme(), "https");
        assert_eq!(t.base_origin(), "https://example.com");
    }

    #[test]
    fn test_parse_rejects_non_http_scheme() {
        assert!(ScanTarget::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_local_paths_are_same_origin() {
        let t = target("http://example.com");
        for reference in ["/about", "contact.html?x=1", "#section", "?page=2", "", "docs/guide.html", "/a/b/c.png#top"] {
            assert!(t.is_same_origin(reference), "expected '{}' to be same-origin", reference);
        }
    }

    #[test]
    fn test_protocol_relative_matches_own_host_only() {
        let t = target("http://example.com");
        assert!(t.is_same_origin("//example.com/style.css"));
        assert!(!t.is_same_origin("//cdn.example.net/style.css"));
    }

    #[test]
    fn test_base_origin_prefix_is_same_origin() {
        let t = target("http://example.com");
        assert!(t.is_same_origin("http://example.com/deep/page"));
        // Different scheme means a different origin string
        assert!(!t.is_same_origin("https://example.com/deep/page"));
        // Different host entirely
        assert!(!t.is_same_origin("http://other.com/page"));
    }

    #[test]
    fn test_about_blank_is_same_origin() {
        let t = target("http://example.com");
        assert!(t.is_same_origin("about:blank"));
    }

    #[test]
    fn test_odd_relative_references_fall_through_to_third_party() {
        // Characters outside the local-path grammar make the reference
        // fail rule 1; with no matching host or origin it ends up
        // third-party even though a browser would treat it as relative.
        let t = target("http://example.com");
        assert!(!t.is_same_origin("my page.html"));
        assert!(!t.is_same_origin("caf\u{e9}.html"));
    }
}
