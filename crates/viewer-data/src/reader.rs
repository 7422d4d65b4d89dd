//! CSV loading for viewer-count samples.
//!
//! Reads a long-format table of `(time, channel, viewers)` rows and turns it
//! into an [`ObservationSet`]. Any malformed row aborts the load: the
//! aggregation stages never see a partially parsed table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use viewer_core::error::{Result, ViewerError};
use viewer_core::models::{ObservationSet, RawObservation};
use viewer_core::time_utils::parse_timestamp;

// ── Column resolution ─────────────────────────────────────────────────────────

const TIME_HEADERS: &[&str] = &["time", "timestamp", "datetime", "時間"];
const CHANNEL_HEADERS: &[&str] = &["channel", "channel_name", "頻道名稱", "頻道"];
const COUNT_HEADERS: &[&str] = &["viewers", "viewer_count", "count", "在線人數"];

/// Field indices of the three required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub time: usize,
    pub channel: usize,
    pub count: usize,
}

impl ColumnMap {
    /// The fixed `{time, channel, count}` order used when the header names
    /// are not recognised.
    pub const POSITIONAL: ColumnMap = ColumnMap {
        time: 0,
        channel: 1,
        count: 2,
    };

    /// Resolve columns by header name, falling back to position.
    ///
    /// Names are matched case-insensitively after trimming and stripping a
    /// UTF-8 BOM. The positional order applies only when none of the names
    /// is recognised, and needs at least three columns. A header naming some
    /// but not all of the columns is rejected.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

        let found = [
            ("time", find(TIME_HEADERS)),
            ("channel", find(CHANNEL_HEADERS)),
            ("viewers", find(COUNT_HEADERS)),
        ];

        if let [(_, Some(time)), (_, Some(channel)), (_, Some(count))] = found {
            return Ok(ColumnMap {
                time,
                channel,
                count,
            });
        }

        let none_recognised = found.iter().all(|(_, idx)| idx.is_none());
        if none_recognised && names.len() >= 3 {
            debug!(?names, "header names not recognised; using positional columns");
            return Ok(Self::POSITIONAL);
        }

        let missing: Vec<&str> = found
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();
        Err(ViewerError::MissingColumns(missing.join(", ")))
    }

    fn width(&self) -> usize {
        self.time.max(self.channel).max(self.count) + 1
    }
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and derive every sample in the CSV file at `path`.
pub fn load_observations(path: &Path) -> Result<ObservationSet> {
    let file = File::open(path).map_err(|source| ViewerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = read_observations(file)?;
    let set = ObservationSet::derive(raw);

    debug!(
        path = %path.display(),
        observations = set.len(),
        channels = set.channels().len(),
        "loaded viewer samples"
    );

    Ok(set)
}

/// Parse raw samples from any CSV source with a header row.
pub fn read_observations<R: Read>(source: R) -> Result<Vec<RawObservation>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1; fall back to the record index if the reader has
        // no position.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(parse_record(&record, columns, line)?);
    }

    Ok(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_record(record: &StringRecord, columns: ColumnMap, line: usize) -> Result<RawObservation> {
    if record.len() < columns.width() {
        return Err(ViewerError::MalformedRow {
            line,
            message: format!(
                "expected at least {} fields, found {}",
                columns.width(),
                record.len()
            ),
        });
    }

    let time_cell = &record[columns.time];
    let timestamp = parse_timestamp(time_cell).ok_or_else(|| ViewerError::TimestampParse {
        line,
        value: time_cell.to_string(),
    })?;

    let channel = &record[columns.channel];
    if channel.is_empty() {
        return Err(ViewerError::MalformedRow {
            line,
            message: "empty channel name".to_string(),
        });
    }

    let count_cell = &record[columns.count];
    let viewer_count = parse_viewer_count(count_cell).ok_or_else(|| ViewerError::ViewerCount {
        line,
        value: count_cell.to_string(),
    })?;

    Ok(RawObservation {
        channel: channel.to_string(),
        timestamp,
        viewer_count,
    })
}

/// Non-negative finite number, integer or float.
fn parse_viewer_count(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
