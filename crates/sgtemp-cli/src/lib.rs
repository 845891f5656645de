//! Command-line console for Singapore air-temperature statistics.
//!
//! Readings come from the data.gov.sg air-temperature API and are kept in a
//! local SQLite database. Statistics requests backfill any missing hours
//! before computing minimum, maximum (with every tied occurrence), mean and
//! median.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `menu` | Interactive menu (default) |
//! | `fetch` | Retrieve and store the readings at one date and time |
//! | `daily` | Statistics for one day |
//! | `monthly` | Statistics for one month |
//! | `all` | Statistics over every stored reading |
//! | `stations` | List stored stations |
//! | `readings` | List stored readings |
//! | `config` | Manage CLI configuration |
//!
//! # Configuration
//!
//! The CLI reads `~/.config/sgtemp/config.toml` (or platform equivalent):
//!
//! - `database`: database file
//! - `api_url`: API base URL
//! - `timeout`: request timeout in seconds
//! - `station`: default station filter
//! - `no_color`: disable colored output
//!
//! # Environment Variables
//!
//! - `SGTEMP_DB`: database file (overridden by `--db`)
//! - `SGTEMP_STATION`: default station (overridden by `--station`)
//! - `SGTEMP_API_URL`: API base URL (overridden by `--api-url`)
//! - `NO_COLOR`: disable colored output when set
//!
//! # Examples
//!
//! ```bash
//! sgtemp daily 2021-03-01 --station S50
//! sgtemp monthly 2021-02 --format json --output feb.json
//! sgtemp fetch 2021-03-01 14:00
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod style;
pub mod util;

// Re-export core dependencies for convenience
pub use sgtemp_core;
pub use sgtemp_types;
