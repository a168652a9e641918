//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Session counters and the end-of-crawl summary
//! - Exporting statistics as JSON files

mod json;
mod summary;

pub use json::{write_json, write_map_trio_reports, write_reports, PopularityRow};
pub use summary::{print_summary, CrawlCounters, CrawlSummary};
