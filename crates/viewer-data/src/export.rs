//! CSV export of the summary table.
//!
//! Files are UTF-8 with a BOM so spreadsheet tools pick the encoding up.
//! Averages are written with two decimals and undefined windows as empty
//! cells; [`parse_summary_csv`] reads the format back.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use csv::StringRecord;
use regex::Regex;
use tracing::info;

use viewer_core::error::{Result, ViewerError};
use viewer_core::formatting::{round_to, DISPLAY_DECIMALS};
use viewer_core::models::{HourWindow, RowKind, SummaryRow};
use viewer_core::time_utils::parse_date;

const BOM: &[u8] = b"\xEF\xBB\xBF";
const ALL_CHANNELS_FILE_STEM: &str = "all_channels";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w-]").expect("regex is valid"));

/// Header row for a table computed with the given windows.
pub fn export_header(window_a: HourWindow, window_b: HourWindow) -> Vec<String> {
    vec![
        "channel".to_string(),
        "date".to_string(),
        "row_type".to_string(),
        "daily_avg".to_string(),
        window_a.label(),
        window_b.label(),
    ]
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Write `rows` as CSV, BOM first.
pub fn write_summary_csv<W: Write>(
    rows: &[SummaryRow],
    window_a: HourWindow,
    window_b: HourWindow,
    mut writer: W,
) -> Result<()> {
    writer.write_all(BOM)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(export_header(window_a, window_b))?;

    for row in rows {
        let date = row
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        csv.write_record([
            row.channel_label().to_string(),
            date,
            row.kind.as_str().to_string(),
            format_cell(Some(row.full_day_avg)),
            format_cell(row.window_a_avg),
            format_cell(row.window_b_avg),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write `rows` into `dir` under [`export_file_name`] and return the path.
pub fn export_summary(
    dir: &Path,
    rows: &[SummaryRow],
    window_a: HourWindow,
    window_b: HourWindow,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(rows));
    let file = File::create(&path)?;
    write_summary_csv(rows, window_a, window_b, BufWriter::new(file))?;

    info!(path = %path.display(), rows = rows.len(), "exported daily summary");
    Ok(path)
}

/// `<channel>_daily_summary.csv` when every daily row belongs to one
/// channel, `all_channels_daily_summary.csv` otherwise. Aggregate rows do not
/// affect the name.
pub fn export_file_name(rows: &[SummaryRow]) -> String {
    let mut channels = rows
        .iter()
        .filter(|r| !r.is_aggregate())
        .map(|r| r.channel.as_deref());
    let stem = match channels.next() {
        Some(Some(first)) if channels.all(|c| c == Some(first)) => {
            UNSAFE_FILE_CHARS.replace_all(first, "_").into_owned()
        }
        _ => ALL_CHANNELS_FILE_STEM.to_string(),
    };
    format!("{stem}_daily_summary.csv")
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!(
            "{:.prec$}",
            round_to(v, DISPLAY_DECIMALS),
            prec = DISPLAY_DECIMALS as usize
        ),
        None => String::new(),
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Parse a file produced by [`write_summary_csv`].
pub fn parse_summary_csv<R: Read>(source: R) -> Result<Vec<SummaryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(parse_summary_record(&record, line)?);
    }
    Ok(rows)
}

fn parse_summary_record(record: &StringRecord, line: usize) -> Result<SummaryRow> {
    let malformed = |message: String| ViewerError::MalformedRow { line, message };

    if record.len() < 6 {
        return Err(malformed(format!(
            "expected 6 fields, found {}",
            record.len()
        )));
    }

    let kind = RowKind::from_tag(&record[2])
        .ok_or_else(|| malformed(format!("unknown row type {:?}", &record[2])))?;

    let channel = match kind {
        RowKind::GlobalMean => None,
        _ => Some(record[0].to_string()),
    };

    let date = match &record[1] {
        "" => None,
        cell => Some(parse_date(cell).ok_or_else(|| malformed(format!("invalid date {cell:?}")))?),
    };

    let number = |cell: &str| -> Result<Option<f64>> {
        if cell.is_empty() {
            return Ok(None);
        }
        cell.parse::<f64>()
            .map(Some)
            .map_err(|_| malformed(format!("invalid number {cell:?}")))
    };

    let full_day_avg =
        number(&record[3])?.ok_or_else(|| malformed("empty daily average".to_string()))?;

    Ok(SummaryRow {
        kind,
        channel,
        date,
        full_day_avg,
        window_a_avg: number(&record[4])?,
        window_b_avg: number(&record[5])?,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
