//! Statistics aggregation
//!
//! This module handles:
//! - Counting wins, losses and picks per grouping key
//! - The grouping functions used to key battles (entity, map + composition)
//! - Ranked and popularity views over the final counters

mod aggregator;
mod grouping;
mod report;

pub use aggregator::StatsAggregator;
pub use grouping::{by_entity, by_map_trio, report_by_map, Grouping, MapTrio};
pub use report::{rank_rows, AggregateCounter, FinalStats, ReportRow};
