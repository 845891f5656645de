//! Output formatting utilities for text and JSON output.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use sgtemp_core::{PointFetch, WindowStatistics};
use sgtemp_types::{Extremum, OrderedReading, Station};

use crate::cli::OutputFormat;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Output format.
    pub format: OutputFormat,
}

impl FormatOptions {
    pub fn new(no_color: bool, format: OutputFormat) -> Self {
        Self { no_color, format }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Serialize value to a pretty JSON string.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    }

    fn heading(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.bold().to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.yellow().to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.dimmed().to_string()
        }
    }

    /// Format a temperature in degrees Celsius.
    #[must_use]
    pub fn format_temp(&self, value: f64) -> String {
        format!("{:.2}°C", value)
    }
}

/// Render any of the command results in the selected format.
pub fn render<T: Serialize>(
    value: &T,
    opts: &FormatOptions,
    text: impl FnOnce(&T, &FormatOptions) -> String,
) -> Result<String> {
    if opts.is_json() {
        opts.as_json(value)
    } else {
        Ok(text(value, opts))
    }
}

pub fn format_stations_text(stations: &[Station], opts: &FormatOptions) -> String {
    if stations.is_empty() {
        return "No stations stored yet. Run 'sgtemp fetch' or a statistics command first.\n"
            .to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", opts.heading("Stations"));
    for station in stations {
        let _ = writeln!(
            out,
            "  {:<6} {:<32} {}",
            station.id,
            station.name,
            opts.dim(&format!("({}, {})", station.latitude, station.longitude))
        );
    }
    out
}

pub fn format_readings_text(readings: &[OrderedReading], opts: &FormatOptions) -> String {
    if readings.is_empty() {
        return "No readings found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        opts.heading(&format!("{:<16}  {:<6} {:<32} {:>8}", "Time", "ID", "Station", "Value"))
    );
    for reading in readings {
        let _ = writeln!(
            out,
            "{:<16}  {:<6} {:<32} {:>8}",
            reading.timestamp.to_string(),
            reading.station_id,
            reading.station_name,
            opts.format_temp(reading.value)
        );
    }
    let _ = writeln!(out, "{} reading(s)", readings.len());
    out
}

pub fn format_point_text(point: &PointFetch, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        opts.heading(&format!("Readings at {}", point.reported))
    );
    if point.reported != point.requested {
        let _ = writeln!(
            out,
            "{}",
            opts.dim(&format!("(requested {})", point.requested))
        );
    }
    let _ = writeln!(
        out,
        "Stored {} new station(s) and {} new reading(s)",
        point.ingested.stations_inserted, point.ingested.readings_inserted
    );
    let _ = writeln!(out);
    out.push_str(&format_readings_text(&point.readings, opts));
    out
}

fn format_extremum(out: &mut String, label: &str, extremum: &Extremum, opts: &FormatOptions) {
    let _ = writeln!(out, "{:<8} {}", label, opts.format_temp(extremum.value));
    for occurrence in &extremum.occurrences {
        let _ = writeln!(out, "         {}", occurrence);
    }
}

pub fn format_window_text(result: &WindowStatistics, opts: &FormatOptions) -> String {
    let stats = &result.statistics;
    let scope = result.station.as_deref().unwrap_or("all stations");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        opts.heading(&format!("Statistics for {} ({})", result.window, scope))
    );
    let _ = writeln!(out, "{:<8} {}", "Readings", stats.count);
    let _ = writeln!(out, "{:<8} {}", "Mean", opts.format_temp(stats.mean));
    let _ = writeln!(out, "{:<8} {}", "Median", opts.format_temp(stats.median));
    format_extremum(&mut out, "Minimum", &stats.minimum, opts);
    format_extremum(&mut out, "Maximum", &stats.maximum, opts);

    let failed = result.failed_hours();
    if failed > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            opts.warning(&format!(
                "Warning: {} hour(s) could not be retrieved; statistics may be incomplete",
                failed
            ))
        );
        for report in result.backfill.iter().filter(|r| !r.is_clean()) {
            for failure in &report.failures {
                let _ = writeln!(
                    out,
                    "  {} {:02}:00  {}",
                    sgtemp_types::format_date(report.date),
                    failure.hour,
                    failure.message
                );
            }
        }
    }
    out
}
