use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};
use crate::models::{AggregateMode, ViewMode};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Daily viewer statistics for live-streaming channels
#[derive(Parser, Debug, Clone)]
#[command(
    name = "viewer-dashboard",
    about = "Daily viewer statistics for live-streaming channels",
    version
)]
pub struct Settings {
    /// CSV file of (time, channel, viewers) samples
    #[arg(
        long,
        env = "VIEWER_DASHBOARD_DATA",
        default_value = "youtube_live_data_long.csv"
    )]
    pub data: PathBuf,

    /// View mode: hourly curves for one channel, or daily cross-channel comparison
    #[arg(long, default_value = "single", value_parser = ["single", "compare"])]
    pub mode: String,

    /// Channel to analyse in single mode (defaults to the first channel);
    /// restricts the table to that channel in compare mode
    #[arg(long)]
    pub channel: Option<String>,

    /// First date of the range, inclusive (defaults to the earliest sample)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date of the range, inclusive (defaults to the latest sample)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Layout of the synthesized mean rows
    #[arg(long, default_value = "auto", value_parser = ["auto", "global", "per-channel"])]
    pub aggregate: String,

    /// Write the summary table as CSV into this directory
    /// (`~/.viewer-dashboard/exports` when no directory is given)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Print the summary table to stdout instead of opening the dashboard
    #[arg(long)]
    pub print: bool,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.viewer-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Default location of the persisted file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".viewer-dashboard").join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments, merge last-used params for anything not given
    /// on the command line, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`](Self::load_with_last_used) with an
    /// explicit argument list and config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
            }
            return settings.resolve();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "data") {
            if let Some(v) = last.data {
                settings.data = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "mode") {
            if let Some(v) = last.mode {
                settings.mode = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = settings.resolve();

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used parameters");
        }

        settings
    }

    /// Typed view mode.
    pub fn view_mode(&self) -> Result<ViewMode> {
        match self.mode.as_str() {
            "single" => Ok(ViewMode::Single),
            "compare" => Ok(ViewMode::Compare),
            other => Err(ViewerError::Config(format!("unknown mode: {other}"))),
        }
    }

    /// Aggregate layout, resolving `"auto"` from the view mode.
    pub fn aggregate_mode(&self) -> Result<AggregateMode> {
        match self.aggregate.as_str() {
            "auto" => Ok(AggregateMode::for_view(self.view_mode()?)),
            "global" => Ok(AggregateMode::Global),
            "per-channel" => Ok(AggregateMode::PerChannel),
            other => Err(ViewerError::Config(format!(
                "unknown aggregate layout: {other}"
            ))),
        }
    }

    /// Apply the `--debug` override.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data: Some(s.data.clone()),
            mode: Some(s.mode.clone()),
            theme: Some(s.theme.clone()),
        }
    }
}

/// `true` when `name` was supplied on the command line (not by default or env).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
