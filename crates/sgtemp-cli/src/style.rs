//! Progress indicators for backfill sweeps and API requests.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use sgtemp_core::SweepProgress;
use sgtemp_types::format_date;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

/// Standard progress bar characters
const PROGRESS_CHARS: &str = "##-";

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("valid template")
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Get the hourly sweep progress bar style.
pub fn sweep_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:24.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars(PROGRESS_CHARS)
}

/// Create a progress bar for hourly backfill sweeps.
///
/// Hidden when `visible` is false so callers can update it unconditionally.
pub fn sweep_progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(u64::from(sgtemp_core::backfill::HOURS_PER_DAY));
    pb.set_style(sweep_bar_style());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Move `pb` to the state reported by a sweep.
pub fn update_sweep(pb: &ProgressBar, progress: SweepProgress) {
    pb.set_length(u64::from(progress.total));
    pb.set_position(u64::from(progress.completed));
    pb.set_message(format!(
        "Retrieving {} {:02}:00",
        format_date(progress.date),
        progress.hour
    ));
}

/// Create a spinner for a single API request.
pub fn fetching_spinner(visible: bool, what: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(format!("Fetching readings for {}...", what));
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_hidden_bar_accepts_updates() {
        let pb = sweep_progress_bar(false);
        update_sweep(
            &pb,
            SweepProgress {
                date: date!(2021 - 03 - 01),
                hour: 4,
                completed: 5,
                total: 24,
            },
        );
        assert_eq!(pb.position(), 5);
        assert_eq!(pb.length(), Some(24));
        pb.finish_and_clear();
    }

    #[test]
    fn test_styles_build() {
        let _ = sweep_bar_style();
        let _ = spinner_style();
    }
}
