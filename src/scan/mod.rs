// src/scan/mod.rs
// =============================================================================
// This module contains all classification logic.
//
// Submodules:
// - target: the scan target and the same-origin check
// - patterns: the @import grammar and the known-provider marker table
// - classify: the classification engine the crawler feeds events into
// - report: the shared, deduplicated findings of one scan
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod classify;
mod patterns;
mod report;
mod target;

// Re-export public items from submodules
// This lets users write `scan::Classifier` instead of
// `scan::classify::Classifier`
pub use classify::Classifier;
pub use report::{Report, ScanSummary};
pub use target::ScanTarget;
