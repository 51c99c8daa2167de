//! Output module for persisting crawl results
//!
//! Each run writes one JSON file named after the crawl start time:
//! `discovered_urls_<timestamp>.json`, mapping every domain to its product
//! URLs. Files are written once and never appended to.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};

use crate::ScoutError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Product URLs discovered per domain
pub type CrawlResult = BTreeMap<String, Vec<String>>;

pub const OUTPUT_FILE_PREFIX: &str = "discovered_urls_";

/// Formats a timestamp for use in a file name
///
/// The ISO 8601 form with millisecond precision has `:`, `.` and `-`
/// replaced by `_`, e.g. `2024-01-01T12:34:56.789Z` becomes
/// `2024_01_01T12_34_56_789Z`.
pub fn file_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.', '-'], "_")
}

/// Returns the output file name for a crawl started at `started_at`
pub fn output_file_name(started_at: DateTime<Utc>) -> String {
    format!("{}{}.json", OUTPUT_FILE_PREFIX, file_timestamp(started_at))
}

/// Serializes results as pretty-printed JSON
///
/// Each domain's URLs are sorted so identical runs produce identical files.
pub fn render_results(results: &CrawlResult) -> Result<String, ScoutError> {
    let sorted: BTreeMap<&str, Vec<&str>> = results
        .iter()
        .map(|(domain, urls)| {
            let mut urls: Vec<&str> = urls.iter().map(String::as_str).collect();
            urls.sort_unstable();
            (domain.as_str(), urls)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&sorted)?)
}

/// Writes results to `<directory>/discovered_urls_<timestamp>.json`
///
/// The directory is created recursively if missing and the file is written
/// in a single call.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(ScoutError)` - Directory creation, serialization or write failed
pub fn write_results(
    directory: &Path,
    started_at: DateTime<Utc>,
    results: &CrawlResult,
) -> Result<PathBuf, ScoutError> {
    std::fs::create_dir_all(directory)?;

    let path = directory.join(output_file_name(started_at));
    let json = render_results(results)?;
    std::fs::write(&path, json)?;

    info!("Data successfully written to {}", path.display());
    Ok(path)
}
