// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// There are no subcommands here - the tool does exactly one thing, so the
// arguments live directly on the Cli struct. The parsed struct is passed
// into the crawler and classifier at construction time; nothing reads
// configuration from global state.
// =============================================================================

use clap::Parser;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "privacy-guardian",
    version = "0.1.0",
    about = "Crawl a website and flag third-party resources with privacy implications",
    long_about = "privacy-guardian crawls a website up to a configurable depth and reports \
                  third-party scripts, links, iframes and stylesheet imports found in the \
                  markup - including known integrations like Google Fonts and Google \
                  Analytics that may trigger privacy-law obligations. Only static markup \
                  and fetched css are inspected; resources injected by JavaScript at \
                  runtime are not seen."
)]
pub struct Cli {
    /// Website URL to scan (e.g., https://example.com)
    ///
    /// This is a positional argument (required); leaving it out is a
    /// usage error
    pub url: String,

    /// Maximum crawl depth when following links
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    /// etc.
    #[arg(short = 'd', long = "depth", default_value_t = 3)]
    pub depth: usize,

    /// Print every visit and finding as it happens
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Output the report in JSON format instead of text
    #[arg(long)]
    pub json: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why no subcommands this time?
//    - The tool has exactly one job: scan a website
//    - Positional arguments + flags on one struct keep the surface small
//    - clap still generates --help, --version and the usage error for a
//      missing URL automatically
//
// 2. What does default_value_t do?
//    - Provides the value used when the flag is absent
//    - The _t suffix means "typed": the default is a usize, not a string
//
// 3. Why pass Cli around instead of globals?
//    - Whoever constructs the crawler and classifier hands them their
//      configuration explicitly
//    - No mutable process-wide state, which matters once the crawl runs
//      on many tasks at once
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["privacy-guardian", "https://example.com"]);
        assert_eq!(cli.url, "https://example.com");
        assert_eq!(cli.depth, 3);
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["privacy-guardian", "-d", "2", "-v", "--json", "example.com"]);
        assert_eq!(cli.depth, 2);
        assert!(cli.verbose);
        assert!(cli.json);
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["privacy-guardian"]).is_err());
    }
}
