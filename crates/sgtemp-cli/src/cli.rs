//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable station filter argument
#[derive(Debug, Clone, Default, Args)]
pub struct StationArgs {
    /// Station ID (e.g. S50), or ALL for every station
    #[arg(short, long, env = "SGTEMP_STATION")]
    pub station: Option<String>,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser)]
#[command(name = "sgtemp")]
#[command(
    author,
    version,
    about = "Singapore air-temperature statistics from data.gov.sg",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (any non-empty NO_COLOR value other than 0/false/no/off)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "SGTEMP_DB")]
    pub db: Option<PathBuf>,

    /// Air-temperature API base URL
    #[arg(long, global = true, env = "SGTEMP_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 'T', long, global = true)]
    pub timeout: Option<u64>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Interactive menu (default when no command is given)
    Menu,

    /// List known weather stations
    Stations {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List stored readings
    Readings {
        #[command(flatten)]
        station: StationArgs,

        /// Only readings on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch and store the readings at one point in time
    Fetch {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(default_value = "")]
        date: String,

        /// Time (HH:MM), defaults to now
        #[arg(default_value = "")]
        time: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Statistics for one day, backfilling missing hours
    Daily {
        /// Date (YYYY-MM-DD), at most yesterday
        date: String,

        /// Also list the day's readings, lowest value first
        #[arg(short, long)]
        list: bool,

        #[command(flatten)]
        station: StationArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Statistics for one month, backfilling missing days
    Monthly {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(default_value = "")]
        month: String,

        #[command(flatten)]
        station: StationArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Statistics over every stored reading
    All {
        #[command(flatten)]
        station: StationArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["sgtemp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_daily_with_station_and_json() {
        let cli =
            Cli::try_parse_from(["sgtemp", "daily", "2021-03-01", "-s", "S50", "-f", "json"])
                .unwrap();
        match cli.command {
            Some(Commands::Daily {
                date,
                list,
                station,
                output,
            }) => {
                assert_eq!(date, "2021-03-01");
                assert!(!list);
                assert_eq!(station.station.as_deref(), Some("S50"));
                assert_eq!(output.format, OutputFormat::Json);
            }
            _ => panic!("expected daily command"),
        }
    }

    #[test]
    fn test_daily_list_flag() {
        let cli = Cli::try_parse_from(["sgtemp", "daily", "2021-03-01", "--list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Daily { list: true, .. })));
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["sgtemp", "all", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::try_parse_from(["sgtemp", "stations", "--no-color"]).unwrap();
        assert!(cli.no_color);
    }

    #[test]
    fn test_fetch_defaults_to_now() {
        let cli = Cli::try_parse_from(["sgtemp", "fetch"]).unwrap();
        match cli.command {
            Some(Commands::Fetch { date, time, .. }) => {
                assert!(date.is_empty());
                assert!(time.is_empty());
            }
            _ => panic!("expected fetch command"),
        }
    }
}
