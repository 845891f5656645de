//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use sgtemp_types::{OrderedReading, Reading, ReadingTimestamp, Station, VALUE_PRECISION};

use crate::error::{Error, Result};
use crate::models::StationCount;
use crate::queries::{ReadingFilter, ReadingOrder};
use crate::schema;

const JOINED: &str = "FROM readings r INNER JOIN stations s ON s.station_id = r.station_id";

/// SQLite-based store for station metadata and temperature readings.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Station operations
impl Store {
    /// Insert a station unless one with the same ID already exists.
    ///
    /// Returns `true` when a row was written. Existing stations keep their
    /// original name and coordinates.
    pub fn insert_station_if_absent(&self, station: &Station) -> Result<bool> {
        if self.get_station(&station.id)?.is_some() {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO stations (station_id, station_name, loc_latitude, loc_longitude)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                station.id,
                station.name,
                station.latitude,
                station.longitude
            ],
        )?;

        debug!("Inserted station {} ({})", station.id, station.name);
        Ok(true)
    }

    /// Get a station by ID.
    pub fn get_station(&self, station_id: &str) -> Result<Option<Station>> {
        let station = self
            .conn
            .query_row(
                "SELECT station_id, station_name, loc_latitude, loc_longitude
                 FROM stations WHERE station_id = ?",
                [station_id],
                station_from_row,
            )
            .optional()?;

        Ok(station)
    }

    /// List all stations ordered by name.
    pub fn list_stations(&self) -> Result<Vec<Station>> {
        let mut stmt = self.conn.prepare(
            "SELECT station_id, station_name, loc_latitude, loc_longitude
             FROM stations ORDER BY station_name, station_id",
        )?;

        let stations = stmt
            .query_map([], station_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(stations)
    }

    /// Count stored stations.
    pub fn count_stations(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stations", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn station_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Station> {
    Ok(Station {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

// Reading operations
impl Store {
    /// Insert a reading unless the same station already has one at that
    /// exact timestamp.
    ///
    /// The value is rounded to [`VALUE_PRECISION`] decimals before it is
    /// written. Returns `true` when a row was written.
    pub fn insert_reading_if_absent(&self, reading: &Reading) -> Result<bool> {
        let parts = reading.timestamp.parts();

        let existing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM readings
             WHERE station_id = ?1 AND yr = ?2 AND mo = ?3 AND dt = ?4 AND hr = ?5 AND mi = ?6",
            params![
                reading.station_id,
                parts.year,
                parts.month,
                parts.day,
                parts.hour,
                parts.minute
            ],
            |row| row.get(0),
        )?;

        if existing > 0 {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO readings (station_id, yr, mo, dt, hr, mi, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                reading.station_id,
                parts.year,
                parts.month,
                parts.day,
                parts.hour,
                parts.minute,
                round_value(reading.value)
            ],
        )?;

        Ok(true)
    }

    /// Count readings (with a known station) matching the filter.
    pub fn count_readings(&self, filter: &ReadingFilter) -> Result<u64> {
        let (where_clause, params) = filter.build_where();
        let sql = format!("SELECT COUNT(*) {} {}", JOINED, where_clause);
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        debug!("Executing query: {}", sql);

        let count: i64 = self
            .conn
            .query_row(&sql, params_ref.as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count readings matching the filter, grouped by station.
    ///
    /// Stations without a matching reading are absent from the result.
    pub fn count_readings_by_station(&self, filter: &ReadingFilter) -> Result<Vec<StationCount>> {
        let (where_clause, params) = filter.build_where();
        let sql = format!(
            "SELECT r.station_id, s.station_name, COUNT(*) {} {} \
             GROUP BY r.station_id, s.station_name ORDER BY s.station_name",
            JOINED, where_clause
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(StationCount {
                    station_id: row.get(0)?,
                    station_name: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Visit every matching reading in the requested order without
    /// materializing the result set.
    ///
    /// Readings whose station is unknown are skipped. Returns the number of
    /// readings visited.
    pub fn scan_readings_ordered<F>(
        &self,
        filter: &ReadingFilter,
        order: ReadingOrder,
        mut visit: F,
    ) -> Result<u64>
    where
        F: FnMut(OrderedReading),
    {
        let (where_clause, params) = filter.build_where();
        let sql = format!(
            "SELECT r.station_id, s.station_name, r.yr, r.mo, r.dt, r.hr, r.mi, r.value \
             {} {} ORDER BY {}",
            JOINED,
            where_clause,
            order.sql()
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_ref.as_slice())?;
        let mut visited = 0u64;

        while let Some(row) = rows.next()? {
            visit(ordered_from_row(row)?);
            visited += 1;
        }

        Ok(visited)
    }

    /// Collect matching readings in the requested order.
    pub fn query_readings(
        &self,
        filter: &ReadingFilter,
        order: ReadingOrder,
    ) -> Result<Vec<OrderedReading>> {
        let mut readings = Vec::new();
        self.scan_readings_ordered(filter, order, |reading| readings.push(reading))?;
        Ok(readings)
    }
}

fn ordered_from_row(row: &rusqlite::Row<'_>) -> Result<OrderedReading> {
    let year: String = row.get(2)?;
    let month: String = row.get(3)?;
    let day: String = row.get(4)?;
    let hour: String = row.get(5)?;
    let minute: String = row.get(6)?;

    let timestamp = ReadingTimestamp::from_parts(&year, &month, &day, &hour, &minute)
        .map_err(|e| Error::InvalidRow(e.to_string()))?;

    Ok(OrderedReading {
        station_id: row.get(0)?,
        station_name: row.get(1)?,
        timestamp,
        value: row.get(7)?,
    })
}

fn round_value(value: f64) -> f64 {
    format!("{:.*}", VALUE_PRECISION, value)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn station(id: &str, name: &str) -> Station {
        Station::from_coordinates(id, name, 1.3, 103.8)
    }

    fn reading(station_id: &str, hour: u8, value: f64) -> Reading {
        Reading {
            station_id: station_id.to_string(),
            timestamp: ReadingTimestamp::on_the_hour(date!(2021 - 03 - 01), hour).unwrap(),
            value,
        }
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_station_if_absent(&station("S50", "Clementi Road"))
            .unwrap();
        store
            .insert_station_if_absent(&station("S24", "Upper Changi Road North"))
            .unwrap();
        store
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count_stations().unwrap(), 0);
        assert_eq!(store.count_readings(&ReadingFilter::new()).unwrap(), 0);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("readings.db");

        let store = Store::open(&path).unwrap();
        store
            .insert_station_if_absent(&station("S50", "Clementi Road"))
            .unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count_stations().unwrap(), 1);
    }

    #[test]
    fn test_insert_station_if_absent() {
        let store = Store::open_in_memory().unwrap();
        assert!(
            store
                .insert_station_if_absent(&station("S50", "Clementi Road"))
                .unwrap()
        );
        assert!(
            !store
                .insert_station_if_absent(&station("S50", "Renamed"))
                .unwrap()
        );

        let stored = store.get_station("S50").unwrap().unwrap();
        assert_eq!(stored.name, "Clementi Road");
        assert_eq!(stored.latitude, "1.30000");
    }

    #[test]
    fn test_list_stations_ordered_by_name() {
        let store = seeded_store();
        let names: Vec<String> = store
            .list_stations()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Clementi Road", "Upper Changi Road North"]);
    }

    #[test]
    fn test_insert_reading_deduplication() {
        let store = seeded_store();
        assert!(store.insert_reading_if_absent(&reading("S50", 0, 25.0)).unwrap());
        assert!(!store.insert_reading_if_absent(&reading("S50", 0, 26.0)).unwrap());
        assert!(store.insert_reading_if_absent(&reading("S24", 0, 26.0)).unwrap());

        assert_eq!(store.count_readings(&ReadingFilter::new()).unwrap(), 2);
    }

    #[test]
    fn test_value_rounded_on_write() {
        let store = seeded_store();
        store
            .insert_reading_if_absent(&reading("S50", 1, 25.123_456_7))
            .unwrap();

        let readings = store
            .query_readings(&ReadingFilter::new(), ReadingOrder::ValueAscending)
            .unwrap();
        assert_eq!(readings[0].value, 25.12346);
    }

    #[test]
    fn test_scan_orders_by_value_then_station_then_time() {
        let store = seeded_store();
        store.insert_reading_if_absent(&reading("S50", 2, 27.0)).unwrap();
        store.insert_reading_if_absent(&reading("S24", 1, 25.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 1, 25.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 0, 25.0)).unwrap();

        let mut seen = Vec::new();
        let visited = store
            .scan_readings_ordered(
                &ReadingFilter::new(),
                ReadingOrder::ValueAscending,
                |r| seen.push((r.station_name, r.timestamp.hour, r.value)),
            )
            .unwrap();

        assert_eq!(visited, 4);
        assert_eq!(
            seen,
            vec![
                ("Clementi Road".to_string(), 0, 25.0),
                ("Clementi Road".to_string(), 1, 25.0),
                ("Upper Changi Road North".to_string(), 1, 25.0),
                ("Clementi Road".to_string(), 2, 27.0),
            ]
        );
    }

    #[test]
    fn test_scan_skips_unknown_stations() {
        let store = seeded_store();
        store.insert_reading_if_absent(&reading("S50", 0, 25.0)).unwrap();
        store.insert_reading_if_absent(&reading("S999", 0, 20.0)).unwrap();

        let readings = store
            .query_readings(&ReadingFilter::new(), ReadingOrder::ValueAscending)
            .unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(store.count_readings(&ReadingFilter::new()).unwrap(), 1);
    }

    #[test]
    fn test_count_with_filters() {
        let store = seeded_store();
        store.insert_reading_if_absent(&reading("S50", 0, 25.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 1, 25.5)).unwrap();
        store.insert_reading_if_absent(&reading("S24", 1, 26.0)).unwrap();
        store
            .insert_reading_if_absent(&Reading {
                station_id: "S50".to_string(),
                timestamp: ReadingTimestamp::new(date!(2021 - 03 - 01), 1, 5).unwrap(),
                value: 25.6,
            })
            .unwrap();

        let day = ReadingFilter::new().date(date!(2021 - 03 - 01));
        assert_eq!(store.count_readings(&day).unwrap(), 4);
        assert_eq!(store.count_readings(&day.clone().hourly()).unwrap(), 3);
        assert_eq!(
            store
                .count_readings(&day.clone().hourly().station("S50"))
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count_readings(&ReadingFilter::new().date(date!(2021 - 03 - 02)))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_count_readings_by_station() {
        let store = seeded_store();
        store.insert_reading_if_absent(&reading("S50", 0, 25.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 1, 25.5)).unwrap();
        store.insert_reading_if_absent(&reading("S24", 1, 26.0)).unwrap();

        let counts = store
            .count_readings_by_station(&ReadingFilter::new().hourly())
            .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].station_name, "Clementi Road");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].station_id, "S24");
        assert_eq!(counts[1].count, 1);
    }

    #[test]
    fn test_station_then_time_order() {
        let store = seeded_store();
        store.insert_reading_if_absent(&reading("S24", 0, 20.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 1, 30.0)).unwrap();
        store.insert_reading_if_absent(&reading("S50", 0, 31.0)).unwrap();

        let readings = store
            .query_readings(&ReadingFilter::new(), ReadingOrder::StationThenTime)
            .unwrap();
        let order: Vec<(String, u8)> = readings
            .into_iter()
            .map(|r| (r.station_id, r.timestamp.hour))
            .collect();
        assert_eq!(
            order,
            vec![
                ("S50".to_string(), 0),
                ("S50".to_string(), 1),
                ("S24".to_string(), 0),
            ]
        );
    }
}
