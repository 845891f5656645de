//! Statistics commands: daily, monthly and all-time windows.

use anyhow::Result;
use serde::Serialize;
use sgtemp_core::{SweepProgress, WindowStatistics};
use sgtemp_types::OrderedReading;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_readings_text, format_window_text, render};
use crate::style;

use super::Session;

/// Window statistics together with the readings behind them.
#[derive(Serialize)]
struct ListedWindow<'a> {
    #[serde(flatten)]
    result: &'a WindowStatistics,
    readings: Vec<OrderedReading>,
}

fn format_listed_text(listed: &ListedWindow<'_>, opts: &FormatOptions) -> String {
    format!(
        "{}\n{}",
        format_readings_text(&listed.readings, opts),
        format_window_text(listed.result, opts)
    )
}

fn warn_failed_hours(result: &WindowStatistics) {
    let failed = result.failed_hours();
    if failed > 0 {
        warn!("{} hour(s) could not be retrieved for {}", failed, result.window);
    }
}

fn emit_window(session: &Session, result: &WindowStatistics, format: OutputFormat) -> Result<()> {
    warn_failed_hours(result);

    let opts = session.opts.with_format(format);
    let content = render(result, &opts, format_window_text)?;
    session.emit(&content)
}

pub async fn cmd_daily(
    session: &Session,
    date: &str,
    station: Option<&str>,
    list: bool,
    format: OutputFormat,
) -> Result<()> {
    let pb = style::sweep_progress_bar(session.show_progress && format == OutputFormat::Text);
    let on_progress = |progress: SweepProgress| style::update_sweep(&pb, progress);

    let result = session
        .selector()
        .with_progress(&on_progress)
        .daily_statistics(date, station)
        .await;
    pb.finish_and_clear();
    let result = result?;

    if !list {
        return emit_window(session, &result, format);
    }

    warn_failed_hours(&result);
    let listed = ListedWindow {
        readings: session.selector().window_readings(&result)?,
        result: &result,
    };
    let opts = session.opts.with_format(format);
    let content = render(&listed, &opts, format_listed_text)?;
    session.emit(&content)
}

pub async fn cmd_monthly(
    session: &Session,
    month: &str,
    station: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let pb = style::sweep_progress_bar(session.show_progress && format == OutputFormat::Text);
    let on_progress = |progress: SweepProgress| style::update_sweep(&pb, progress);

    let result = session
        .selector()
        .with_progress(&on_progress)
        .monthly_statistics(month, station)
        .await;
    pb.finish_and_clear();

    emit_window(session, &result?, format)
}

pub fn cmd_all(session: &Session, station: Option<&str>, format: OutputFormat) -> Result<()> {
    let result = session.selector().all_time_statistics(station)?;
    emit_window(session, &result, format)
}
