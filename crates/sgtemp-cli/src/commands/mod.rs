//! Command implementations for the CLI.

mod config;
mod fetch;
mod menu;
mod readings;
mod stations;
mod stats;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sgtemp_core::{WeatherClient, WindowSelector};
use sgtemp_store::Store;

use crate::format::FormatOptions;
use crate::util::write_output;

pub use config::cmd_config;
pub use fetch::cmd_fetch;
pub use menu::cmd_menu;
pub use readings::cmd_readings;
pub use stations::cmd_stations;
pub use stats::{cmd_all, cmd_daily, cmd_monthly};

/// Everything a command needs: the store, the API client and output settings.
pub struct Session {
    pub store: Store,
    pub client: WeatherClient,
    pub output: Option<PathBuf>,
    pub opts: FormatOptions,
    /// Show spinners and progress bars on stderr.
    pub show_progress: bool,
}

impl Session {
    pub fn open(
        database: &Path,
        api_url: &str,
        timeout: Duration,
        output: Option<PathBuf>,
        opts: FormatOptions,
        show_progress: bool,
    ) -> Result<Self> {
        let store = Store::open(database)
            .with_context(|| format!("Failed to open database {}", database.display()))?;
        let client = WeatherClient::with_timeout(api_url, timeout)
            .with_context(|| format!("Invalid API URL {}", api_url))?;

        Ok(Self {
            store,
            client,
            output,
            opts,
            show_progress,
        })
    }

    pub fn selector(&self) -> WindowSelector<'_, WeatherClient> {
        WindowSelector::new(&self.client, &self.store)
    }

    /// Write rendered output to the configured destination.
    pub fn emit(&self, content: &str) -> Result<()> {
        write_output(self.output.as_ref(), content)
    }
}
