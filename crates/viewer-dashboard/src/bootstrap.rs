use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the per-user state directory under `$HOME`.
const APP_DIR_NAME: &str = ".viewer-dashboard";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.viewer-dashboard`, or `./.viewer-dashboard` when there is no home.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Ensure the standard `~/.viewer-dashboard/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.viewer-dashboard/`
/// - `~/.viewer-dashboard/logs/`
/// - `~/.viewer-dashboard/exports/`
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    ensure_directories_in(&app_dir())
}

fn ensure_directories_in(root: &Path) -> anyhow::Result<PathBuf> {
    for dir in [root.to_path_buf(), root.join("logs"), root.join("exports")] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("could not create {}", dir.display()))?;
    }
    Ok(root.to_path_buf())
}

/// Target directory for `--export`: the given one, or the default exports
/// directory for a bare flag.
pub fn export_dir(requested: Option<&Path>) -> PathBuf {
    requested
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app_dir().join("exports"))
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names to an `EnvFilter` directive.
fn level_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, events are appended to that file instead of stderr so
/// they do not tear the TUI.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("logging already initialised")?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories_in() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join(APP_DIR_NAME);

        let created = ensure_directories_in(&root).expect("ensure_directories should succeed");

        assert_eq!(created, root);
        assert!(root.is_dir(), ".viewer-dashboard dir must exist");
        assert!(root.join("logs").is_dir(), "logs subdir must exist");
        assert!(root.join("exports").is_dir(), "exports subdir must exist");
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join(APP_DIR_NAME);
        ensure_directories_in(&root).unwrap();
        ensure_directories_in(&root).unwrap();
        assert!(root.join("exports").is_dir());
    }

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("viewer_data=trace"), "viewer_data=trace");
    }

    #[test]
    fn test_export_dir() {
        assert_eq!(export_dir(Some(Path::new("/tmp/x"))), PathBuf::from("/tmp/x"));
        assert!(export_dir(None).ends_with(".viewer-dashboard/exports"));
    }
}
