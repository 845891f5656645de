//! Readings command - list stored readings.

use anyhow::Result;
use sgtemp_core::validation::validate_date;
use sgtemp_store::ReadingFilter;

use crate::cli::OutputFormat;
use crate::format::{format_readings_text, render};

use super::Session;

pub fn cmd_readings(
    session: &Session,
    station: Option<&str>,
    date: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let selector = session.selector();

    let mut filter = ReadingFilter::new().station_opt(station);
    if let Some(input) = date.filter(|d| !d.trim().is_empty()) {
        filter = filter.date(validate_date(input, selector.today())?);
    }

    let readings = selector.list_readings(&filter)?;
    let opts = session.opts.with_format(format);
    let content = render(&readings, &opts, |r, o| format_readings_text(r, o))?;
    session.emit(&content)
}
