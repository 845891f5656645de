//! Interactive menu.

use anyhow::{Context, Result, bail};
use dialoguer::{Select, theme::ColorfulTheme};
use owo_colors::OwoColorize;

use crate::cli::OutputFormat;
use crate::util::{is_interactive, prompt_text, select_station};

use super::{Session, cmd_all, cmd_daily, cmd_fetch, cmd_monthly, cmd_readings, cmd_stations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Fetch,
    Daily,
    Monthly,
    AllTime,
    Stations,
    Readings,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 7] = [
        MenuItem::Fetch,
        MenuItem::Daily,
        MenuItem::Monthly,
        MenuItem::AllTime,
        MenuItem::Stations,
        MenuItem::Readings,
        MenuItem::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::Fetch => "Fetch readings at a date and time",
            MenuItem::Daily => "Daily statistics",
            MenuItem::Monthly => "Monthly statistics",
            MenuItem::AllTime => "All-time statistics",
            MenuItem::Stations => "List stations",
            MenuItem::Readings => "List readings",
            MenuItem::Exit => "Exit",
        }
    }
}

/// Run the menu until the user picks Exit.
///
/// A failed action is reported and the menu is shown again.
pub async fn cmd_menu(session: &Session) -> Result<()> {
    if !is_interactive() {
        bail!("The interactive menu needs a terminal. Run 'sgtemp --help' to see the commands.");
    }

    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();

    loop {
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()
            .context("Failed to get user selection")?;

        let item = MenuItem::ALL[selection];
        if item == MenuItem::Exit {
            return Ok(());
        }

        if let Err(e) = run_item(session, item).await {
            let message = format!("Error: {:#}", e);
            if session.opts.no_color {
                eprintln!("{}", message);
            } else {
                eprintln!("{}", message.red());
            }
        }
        println!();
    }
}

async fn run_item(session: &Session, item: MenuItem) -> Result<()> {
    let text = OutputFormat::Text;
    match item {
        MenuItem::Fetch => {
            let date = prompt_text("Date (YYYY-MM-DD, empty for today)")?;
            let time = prompt_text("Time (HH:MM, empty for now)")?;
            cmd_fetch(session, &date, &time, text).await
        }
        MenuItem::Daily => {
            let date = prompt_text("Date (YYYY-MM-DD, at most yesterday)")?;
            let station = pick_station(session)?;
            cmd_daily(session, &date, station.as_deref(), true, text).await
        }
        MenuItem::Monthly => {
            let month = prompt_text("Month (YYYY-MM, empty for this month)")?;
            let station = pick_station(session)?;
            cmd_monthly(session, &month, station.as_deref(), text).await
        }
        MenuItem::AllTime => {
            let station = pick_station(session)?;
            cmd_all(session, station.as_deref(), text)
        }
        MenuItem::Stations => cmd_stations(session, text),
        MenuItem::Readings => {
            let station = pick_station(session)?;
            let date = prompt_text("Date (YYYY-MM-DD, empty for every date)")?;
            cmd_readings(session, station.as_deref(), Some(&date), text)
        }
        MenuItem::Exit => Ok(()),
    }
}

fn pick_station(session: &Session) -> Result<Option<String>> {
    let stations = session.selector().list_stations()?;
    select_station(&stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ends_with_exit() {
        assert_eq!(MenuItem::ALL.last(), Some(&MenuItem::Exit));
        assert_eq!(MenuItem::ALL.len(), 7);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<&str> = MenuItem::ALL.iter().map(|i| i.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), MenuItem::ALL.len());
    }
}
