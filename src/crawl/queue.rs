// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl itself: a depth-limited, same-host,
// breadth-first walk of the target website.
//
// How it works:
// 1. Start with the seed URL at depth 1
// 2. Fetch every URL of the current depth level concurrently
// 3. As each response arrives, hand it to the classifier:
//    css responses go to the @import scanner, HTML pages are parsed and
//    their elements classified
// 4. Same-host links found on a page become the next depth level
//    (unless the page already sits at the maximum depth)
// 5. Repeat until there is nothing left to visit
//
// crawl_site only returns once every queued and in-flight visit has
// completed - the caller can snapshot the report the moment it returns.
//
// Rust concepts:
// - HashSet: To track visited URLs (O(1) lookup)
// - buffer_unordered: Run up to N fetches at once, take results as they
//   finish
// =============================================================================

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use super::page;
use crate::scan::Classifier;

// How many pages we fetch at the same time
//
// Balance between scan speed and politeness towards the target server.
const MAX_CONCURRENT_FETCHES: usize = 8;

// Per-request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

// Represents a URL scheduled for visiting
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize, // How many levels deep from the starting URL
}

// One fetched response body plus what the server said it is
struct Fetched {
    body: String,
    content_type: String,
}

// Crawls the classifier's target website
//
// Parameters:
//   classifier: the scan's classification engine (also knows the target)
//   max_depth: maximum crawl depth (1 = just the starting page)
//
// Every visited URL produces an on_visit event; every element and css
// body produces its classification event. Individual fetch failures are
// reported on stderr and skipped - a dead link must not kill the scan.
pub async fn crawl_site(classifier: &Classifier, max_depth: usize) -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    // Track visited URLs so the same page is never fetched twice
    let mut visited = HashSet::new();

    // The current depth level, starting with just the seed
    let mut level = vec![CrawlItem {
        url: classifier.target().url().to_string(),
        depth: 1,
    }];

    while !level.is_empty() {
        // Claim the level's URLs before fetching so duplicates queued
        // from different pages collapse into one visit
        let mut batch = Vec::new();
        for item in level.drain(..) {
            if visited.insert(item.url.clone()) {
                batch.push(item);
            }
        }

        let mut next_level: Vec<CrawlItem> = Vec::new();

        // Fetch the whole level concurrently, classify as results arrive
        let fetches = batch.into_iter().map(|item| {
            let client = client.clone();
            async move {
                let result = fetch(&client, &item.url).await;
                (item, result)
            }
        });
        let mut responses = stream::iter(fetches).buffer_unordered(MAX_CONCURRENT_FETCHES);

        while let Some((item, result)) = responses.next().await {
            let fetched = match result {
                Ok(fetched) => fetched,
                Err(e) => {
                    eprintln!("Warning: failed to fetch {}: {}", item.url, e);
                    continue;
                }
            };

            classifier.on_visit(&item.url);

            if is_css_response(&item.url, &fetched.content_type) {
                classifier.on_css_response(&item.url, &fetched.body);
                continue;
            }

            let follows = page::scan_page(classifier, &item.url, &fetched.body);

            // Pages at the depth limit are still classified, their links
            // just aren't followed any further
            if item.depth < max_depth {
                for url in follows {
                    if !visited.contains(&url) {
                        next_level.push(CrawlItem {
                            url,
                            depth: item.depth + 1,
                        });
                    }
                }
            }
        }

        level = next_level;
    }

    Ok(())
}

// Fetches one URL and returns its body with the content type
async fn fetch(client: &Client, url: &str) -> Result<Fetched> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body = response.text().await?;

    Ok(Fetched { body, content_type })
}

// Decides whether a response should be treated as a stylesheet
//
// Either the URL path says so ("/assets/main.css") or the server does
// (content type "text/css").
fn is_css_response(url: &str, content_type: &str) -> bool {
    if content_type.split(';').next().unwrap_or("").trim() == "text/css" {
        return true;
    }
    Url::parse(url)
        .map(|parsed| parsed.path().ends_with("css"))
        .unwrap_or(false)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is buffer_unordered?
//    - Takes a stream of futures and runs up to N of them at once
//    - Results come out as they finish, not in submission order
//    - It's like Promise.all() with a concurrency limit
//
// 2. Why crawl level by level?
//    - Everything at depth 2 is fetched before anything at depth 3
//    - That makes the depth limit exact: a page only enters the next
//      level if its parent sat below the maximum
//
// 3. What is HashSet::insert returning?
//    - true if the value was newly inserted, false if it was already there
//    - One call both marks the URL visited and tells us whether to fetch it
//
// 4. Why does the classifier get the URL string and not a parsed Url?
//    - The same-origin rules are written against raw reference strings
//    - Parsing is only needed for things we actually request
// -----------------------------------------------------------------------------
