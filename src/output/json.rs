//! JSON report export
//!
//! This module handles writing the final statistics to disk:
//! - `<prefix>_winrates.json`: ranked win/loss/winrate rows
//! - `<prefix>_popularity.json`: pick counts, most picked first
//! - `<prefix>_popularity_alphabetical.json`: pick counts ordered by key
//! - `map_trio_by_map.json`: ranked compositions grouped per map (map-trio only)
//! - `crawl_summary.json`: session counters

use crate::output::CrawlSummary;
use crate::stats::{report_by_map, MapTrio, StatsAggregator};
use crate::RippleError;
use serde::Serialize;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One popularity entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularityRow<K> {
    pub key: K,
    pub picks: u64,
}

/// Writes `value` as pretty-printed JSON to `path`
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RippleError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes the winrate, popularity and summary reports
///
/// # Arguments
///
/// * `dir` - Output directory, created if missing
/// * `prefix` - File name prefix of the statistics reports
/// * `stats` - Final statistics of the crawl
/// * `summary` - Session summary
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of every file written
/// * `Err(RippleError)` - Failed to create the directory or write a file
pub fn write_reports<K>(
    dir: &Path,
    prefix: &str,
    stats: &StatsAggregator<K>,
    summary: &CrawlSummary,
) -> Result<Vec<PathBuf>, RippleError>
where
    K: Serialize + Clone + Eq + Hash + Ord,
{
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(format!("{}_winrates.json", prefix));
    write_json(&path, &stats.report())?;
    written.push(path);

    let ranked: Vec<PopularityRow<K>> = stats
        .popularity_ranked()
        .into_iter()
        .map(|(key, picks)| PopularityRow { key, picks })
        .collect();
    let path = dir.join(format!("{}_popularity.json", prefix));
    write_json(&path, &ranked)?;
    written.push(path);

    let alphabetical: Vec<PopularityRow<K>> = stats
        .popularity()
        .into_iter()
        .map(|(key, picks)| PopularityRow { key, picks })
        .collect();
    let path = dir.join(format!("{}_popularity_alphabetical.json", prefix));
    write_json(&path, &alphabetical)?;
    written.push(path);

    let path = dir.join("crawl_summary.json");
    write_json(&path, summary)?;
    written.push(path);

    tracing::info!("Wrote {} report files to {}", written.len(), dir.display());
    Ok(written)
}

/// Writes the standard reports plus compositions grouped per map
pub fn write_map_trio_reports(
    dir: &Path,
    stats: &StatsAggregator<MapTrio>,
    summary: &CrawlSummary,
) -> Result<Vec<PathBuf>, RippleError> {
    let mut written = write_reports(dir, "map_trio", stats, summary)?;

    let path = dir.join("map_trio_by_map.json");
    write_json(&path, &report_by_map(&stats.report()))?;
    written.push(path);

    Ok(written)
}
