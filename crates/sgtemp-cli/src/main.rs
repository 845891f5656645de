use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sgtemp_cli::cli::{Cli, Commands};
use sgtemp_cli::commands::{
    Session, cmd_all, cmd_config, cmd_daily, cmd_fetch, cmd_menu, cmd_monthly, cmd_readings,
    cmd_stations,
};
use sgtemp_cli::config::{Config, resolve_api_url, resolve_database, resolve_station, resolve_timeout};
use sgtemp_cli::format::FormatOptions;
use sgtemp_cli::util::is_interactive;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let command = cli.command.clone().unwrap_or(Commands::Menu);

    if let Commands::Config { action } = &command {
        return cmd_config(action.clone(), &config);
    }

    let no_color = cli.no_color || config.no_color;
    let database = resolve_database(cli.db.clone(), &config);
    let api_url = resolve_api_url(cli.api_url.clone(), &config);
    let timeout = resolve_timeout(cli.timeout, &config);
    let show_progress = !cli.quiet && is_interactive();

    tracing::debug!("Using database {}", database.display());

    let session = Session::open(
        &database,
        &api_url,
        timeout,
        cli.output.clone(),
        FormatOptions::new(no_color, Default::default()),
        show_progress,
    )?;

    match command {
        Commands::Menu => cmd_menu(&session).await,
        Commands::Stations { output } => cmd_stations(&session, output.format),
        Commands::Readings {
            station,
            date,
            output,
        } => {
            let station = resolve_station(station.station, &config);
            cmd_readings(&session, station.as_deref(), date.as_deref(), output.format)
        }
        Commands::Fetch { date, time, output } => {
            cmd_fetch(&session, &date, &time, output.format).await
        }
        Commands::Daily {
            date,
            list,
            station,
            output,
        } => {
            let station = resolve_station(station.station, &config);
            cmd_daily(&session, &date, station.as_deref(), list, output.format).await
        }
        Commands::Monthly {
            month,
            station,
            output,
        } => {
            let station = resolve_station(station.station, &config);
            cmd_monthly(&session, &month, station.as_deref(), output.format).await
        }
        Commands::All { station, output } => {
            let station = resolve_station(station.station, &config);
            cmd_all(&session, station.as_deref(), output.format)
        }
        Commands::Config { .. } => Ok(()),
    }
}
