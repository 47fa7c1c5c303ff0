//! Output module for run reports and catalog statistics
//!
//! This module handles:
//! - Printing the outcome of a run, one line per site
//! - Loading and printing per-site catalog statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStatistics, SiteStatistics};

use crate::crawler::{RunSummary, SiteReport};

/// Formats one site's outcome on a single line
pub fn format_site_report(report: &SiteReport) -> String {
    match &report.error {
        Some(error) => format!("{} [{}] {}", report.site, report.state, error),
        None => format!(
            "{} [{}] {} entries, {} stored, {} skipped, {} variants, {} without detail, {} image failures",
            report.site,
            report.state,
            report.entries,
            report.stored,
            report.skipped,
            report.variants,
            report.details_missing,
            report.images_failed
        ),
    }
}

/// Prints a finished run to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    for report in &summary.reports {
        println!("  {}", format_site_report(report));
    }
    if !summary.reports.is_empty() {
        println!();
    }

    println!(
        "Sites: {} completed, {} failed ({} total)",
        summary.completed(),
        summary.failed(),
        summary.reports.len()
    );
    println!("Products stored: {}", summary.stored());
}
