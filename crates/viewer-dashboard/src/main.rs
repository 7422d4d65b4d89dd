mod bootstrap;

use anyhow::{Context, Result};
use viewer_core::settings::Settings;
use viewer_data::analysis::DashboardReport;
use viewer_data::export::export_summary;
use viewer_runtime::data_manager::SourceCache;
use viewer_runtime::orchestrator::{DashboardOrchestrator, RequestParams};
use viewer_ui::app::{restore_terminal, App};
use viewer_ui::table_view::render_plain_table;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Viewer Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Mode: {}, Theme: {}",
        settings.data.display(),
        settings.mode,
        settings.theme
    );

    let source = SourceCache::global()
        .get_or_load(&settings.data)
        .with_context(|| format!("failed to load {}", settings.data.display()))?;

    let params = RequestParams::from_settings(&settings)?;
    let report = DashboardOrchestrator::new(source).run(&params);

    if report.is_empty() {
        tracing::warn!("no samples match the selected channel and date range");
    }

    let exported = match &settings.export {
        Some(dir) => {
            let calc = &report.request.calculator;
            let path = export_summary(
                &bootstrap::export_dir(dir.as_deref()),
                &report.table,
                calc.window_a,
                calc.window_b,
            )?;
            Some(path)
        }
        None => None,
    };

    if settings.print {
        print_report(&report);
    } else {
        run_tui(&settings.theme, report).await?;
    }

    if let Some(path) = exported {
        println!("Exported summary to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &DashboardReport) {
    let calc = &report.request.calculator;
    print!(
        "{}",
        render_plain_table(&report.table, (calc.window_a, calc.window_b))
    );
}

/// Run the dashboard on a blocking thread and race it against an OS-level
/// Ctrl+C, which can still arrive while the terminal is in raw mode.
async fn run_tui(theme: &str, report: DashboardReport) -> Result<()> {
    let app = App::new(theme);
    let ui = tokio::task::spawn_blocking(move || app.run_dashboard(&report));

    tokio::select! {
        joined = ui => {
            joined.context("dashboard thread panicked")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            restore_terminal()?;
            // The blocking UI thread cannot be cancelled.
            std::process::exit(130);
        }
    }

    Ok(())
}
