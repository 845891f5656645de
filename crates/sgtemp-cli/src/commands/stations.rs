//! Stations command implementation.

use anyhow::Result;

use crate::cli::OutputFormat;
use crate::format::{format_stations_text, render};

use super::Session;

pub fn cmd_stations(session: &Session, format: OutputFormat) -> Result<()> {
    let stations = session.selector().list_stations()?;
    let opts = session.opts.with_format(format);
    let content = render(&stations, &opts, |s, o| format_stations_text(s, o))?;
    session.emit(&content)
}
