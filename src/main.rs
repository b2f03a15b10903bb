// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the scan target, report and classifier
// 3. Run the crawl (it returns once every visit has completed)
// 4. Snapshot the report and print it
// 5. Exit with proper code (0 = clean, 1 = third-party findings, 2 = error)
//
// Rust concepts used:
// - async/await: Because the crawl makes many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc: Shared ownership of the report between main and the classifier
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod crawl;         // src/crawl/ - website crawling logic
mod scan;          // src/scan/ - classification logic

// Import items we need from our modules
use cli::Cli;
use clap::Parser;  // Parser trait enables the parse() method
use scan::{Classifier, Report, ScanSummary, ScanTarget};

use std::sync::Arc;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    // std::process::exit() terminates the program with the given code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = no third-party findings
//   Ok(1) = third-party findings present
//   Err = error (handled in main, exit code 2)
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, missing URL etc.
    let cli = Cli::parse();

    let target = ScanTarget::parse(&cli.url)?;

    println!("crawling {}", target.raw());

    // One report per scan, shared between us and the classifier.
    // The classifier mutates it during the crawl; we read it after.
    let report = Arc::new(Report::new());
    let classifier = Classifier::new(target, Arc::clone(&report), cli.verbose);

    // The crawl only returns once all queued and in-flight visits are
    // done, so the snapshot below sees the complete result
    crawl::crawl_site(&classifier, cli.depth).await?;

    // Terminate the rewritten progress line
    println!();

    let summary = report.snapshot();

    if cli.json {
        // Serialize the summary to JSON and print
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.has_findings() {
        Ok(1)  // Exit code 1 = third-party findings
    } else {
        Ok(0)  // Exit code 0 = nothing found
    }
}

// Prints the findings as a human-readable report
//
// Grouped by how certain the finding is:
// - definite integrations (the resource is loaded by the markup)
// - URLs found in markup that are not necessarily fetched or executed
// - informational notes
fn print_summary(summary: &ScanSummary) {
    let mut printed_any = false;

    // Definite integrations
    if summary.google_analytics_script_src {
        println!("🚨 Website uses Google Analytics via <script src>");
        printed_any = true;
    }
    if summary.google_analytics_iframe {
        println!("🚨 Website uses Google Analytics via <iframe>");
        printed_any = true;
    }
    if summary.google_fonts_link {
        println!("🚨 Website uses Google Fonts via <link>");
        printed_any = true;
    }
    if !summary.google_fonts_css.is_empty() {
        println!(
            "🚨 Website uses Google Fonts in css file @import: {}",
            summary.google_fonts_css.join(", ")
        );
        printed_any = true;
    }
    if !summary.google_fonts_style.is_empty() {
        println!(
            "🚨 Website uses Google Fonts in <style> @import: {}",
            summary.google_fonts_style.join(", ")
        );
        printed_any = true;
    }

    // Found in markup, not necessarily executed
    if summary.google_analytics_inline_script {
        println!("⚠️  Found Google Analytics URL in <script> (this doesn't imply that it gets executed)");
        printed_any = true;
    }
    if summary.google_fonts_inline_script {
        println!("⚠️  Found Google Fonts URL in <script> (this doesn't imply that it gets executed)");
        printed_any = true;
    }
    if !summary.other_links.is_empty() {
        println!("⚠️  Found 3rd party <link> elements: {}", summary.other_links.join(", "));
        printed_any = true;
    }
    if !summary.other_scripts.is_empty() {
        println!("⚠️  Found 3rd party <script> elements: {}", summary.other_scripts.join(", "));
        printed_any = true;
    }
    if !summary.other_iframes.is_empty() {
        println!("⚠️  Found 3rd party <iframe> elements: {}", summary.other_iframes.join(", "));
        printed_any = true;
    }
    if !summary.other_css_imports.is_empty() {
        println!("⚠️  Found 3rd party @import in css: {}", summary.other_css_imports.join(", "));
        printed_any = true;
    }
    if !summary.other_preconnect.is_empty() {
        println!(
            "⚠️  Found 3rd party <link rel='preconnect'> elements: {}",
            summary.other_preconnect.join(", ")
        );
        printed_any = true;
    }
    if !summary.other_style_imports.is_empty() {
        println!(
            "⚠️  Found 3rd party @import in <style> elements: {}",
            summary.other_style_imports.join(", ")
        );
        printed_any = true;
    }

    // Informational
    if summary.dns_prefetch {
        println!("ℹ️  Found <link rel='dns-prefetch'> elements");
        printed_any = true;
    }

    if !printed_any {
        println!("✅ No third-party resources found");
    }

    println!();
    println!("📊 {} page(s) visited", summary.visits);
}
