//! Utility functions for CLI operations.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Input, Select, theme::ColorfulTheme};

use sgtemp_types::Station;

/// Label for the "every station" choice.
pub const ALL_STATIONS: &str = "ALL";

/// Whether both stdin and stderr are attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Selection labels: `ALL` first, then `Name (ID)` for every station.
pub fn station_choices(stations: &[Station]) -> Vec<String> {
    std::iter::once(ALL_STATIONS.to_string())
        .chain(stations.iter().map(|s| format!("{} ({})", s.name, s.id)))
        .collect()
}

/// Prompt for a station. `None` means every station.
pub fn select_station(stations: &[Station]) -> Result<Option<String>> {
    let items = station_choices(stations);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a station")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to get user selection")?;

    Ok(match selection {
        0 => None,
        n => stations.get(n - 1).map(|s| s.id.clone()),
    })
}

/// Prompt for free text. An empty answer is allowed.
pub fn prompt_text(prompt: &str) -> Result<String> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read input")?;
    Ok(value.trim().to_string())
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_choices_all_first() {
        let stations = vec![
            Station::from_coordinates("S109", "Ang Mo Kio Avenue 5", 1.3764, 103.8492),
            Station::from_coordinates("S50", "Clementi Road", 1.3337, 103.7768),
        ];
        let choices = station_choices(&stations);
        assert_eq!(
            choices,
            vec![
                "ALL".to_string(),
                "Ang Mo Kio Avenue 5 (S109)".to_string(),
                "Clementi Road (S50)".to_string(),
            ]
        );
    }

    #[test]
    fn test_station_choices_empty_store() {
        assert_eq!(station_choices(&[]), vec!["ALL".to_string()]);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
