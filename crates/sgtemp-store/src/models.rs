//! Data models for query results.

use serde::{Deserialize, Serialize};

/// Number of stored readings for one station within a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationCount {
    pub station_id: String,
    pub station_name: String,
    pub count: u64,
}
