//! Fetch command - retrieve one point in time from the API.

use anyhow::Result;

use crate::cli::OutputFormat;
use crate::format::{format_point_text, render};
use crate::style;

use super::Session;

pub async fn cmd_fetch(session: &Session, date: &str, time: &str, format: OutputFormat) -> Result<()> {
    let opts = session.opts.with_format(format);
    let label = match (date.trim(), time.trim()) {
        ("", "") => "now".to_string(),
        (d, t) => format!("{} {}", d, t).trim().to_string(),
    };

    let spinner = style::fetching_spinner(session.show_progress && !opts.is_json(), &label);
    let result = session.selector().fetch_point(date, time).await;
    spinner.finish_and_clear();

    let point = result?;
    let content = render(&point, &opts, format_point_text)?;
    session.emit(&content)
}
