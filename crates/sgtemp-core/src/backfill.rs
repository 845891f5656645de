//! Day completeness checks and on-demand retrieval.
//!
//! A day is complete when every station that has any top-of-the-hour reading
//! for it has all 24. An incomplete (or empty) day is re-swept in full: one
//! request per hour, strictly in order, with per-hour failures recorded and
//! skipped rather than aborting the sweep.

use serde::Serialize;
use time::{Date, Duration, Month};
use tracing::{debug, info, warn};

use sgtemp_store::{ReadingFilter, Store};

use crate::api::FetchResponse;
use crate::error::{Error, HourFailure, Result};
use crate::traits::WeatherSource;

/// Top-of-the-hour slots in a complete day.
pub const HOURS_PER_DAY: u8 = 24;

/// Outcome of a completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackfillState {
    /// Every present station already had 24 hourly readings.
    Complete,
    /// A sweep was run.
    Filled,
}

/// What a completeness check did for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub date: Date,
    pub state: BackfillState,
    pub api_calls: u32,
    pub stations_inserted: usize,
    pub readings_inserted: usize,
    pub failures: Vec<HourFailure>,
}

impl BackfillReport {
    fn new(date: Date, state: BackfillState) -> Self {
        Self {
            date,
            state,
            api_calls: 0,
            stations_inserted: 0,
            readings_inserted: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every requested hour was served.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a report with failed hours into [`Error::PartialBackfillFailure`].
    pub fn into_partial_failure(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(Error::PartialBackfillFailure {
                date: self.date,
                failures: self.failures,
            })
        }
    }
}

/// Rows written by one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub stations_inserted: usize,
    pub readings_inserted: usize,
}

/// Progress of an hourly sweep, reported after each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepProgress {
    pub date: Date,
    pub hour: u8,
    pub completed: u8,
    pub total: u8,
}

/// Store stations and readings from a response, skipping rows already present.
///
/// A row that fails to write is logged and skipped.
pub fn ingest(store: &Store, response: &FetchResponse) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for station in &response.stations {
        match store.insert_station_if_absent(station) {
            Ok(true) => summary.stations_inserted += 1,
            Ok(false) => {}
            Err(e) => warn!("Failed to store station {}: {}", station.id, e),
        }
    }

    for reading in &response.readings {
        match store.insert_reading_if_absent(reading) {
            Ok(true) => summary.readings_inserted += 1,
            Ok(false) => {}
            Err(e) => warn!(
                "Failed to store reading {} at {}: {}",
                reading.station_id, reading.timestamp, e
            ),
        }
    }

    debug!(
        "Ingested {} station(s), {} reading(s) at {}",
        summary.stations_inserted, summary.readings_inserted, response.timestamp
    );

    summary
}

/// Last day of a month.
pub fn last_day_of_month(year: i32, month: Month) -> Result<Date> {
    let next_month = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        _ => Date::from_calendar_date(year, month.next(), 1),
    }
    .map_err(|e| Error::InvalidCalendarDate(e.to_string()))?;

    Ok(next_month - Duration::days(1))
}

/// Runs completeness checks and sweeps against a source and a store.
pub struct Backfiller<'a, S: WeatherSource + ?Sized> {
    source: &'a S,
    store: &'a Store,
    progress: Option<&'a dyn Fn(SweepProgress)>,
}

impl<'a, S: WeatherSource + ?Sized> Backfiller<'a, S> {
    pub fn new(source: &'a S, store: &'a Store) -> Self {
        Self {
            source,
            store,
            progress: None,
        }
    }

    /// Call `progress` after every hourly request.
    pub fn with_progress(mut self, progress: &'a dyn Fn(SweepProgress)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Make sure `date` has 24 hourly readings for every present station,
    /// sweeping the day when it does not.
    ///
    /// With `station` set, only that station's readings are considered.
    pub async fn ensure_day_complete(
        &self,
        date: Date,
        station: Option<&str>,
    ) -> Result<BackfillReport> {
        let filter = ReadingFilter::new()
            .date(date)
            .hourly()
            .station_opt(station);
        let counts = self.store.count_readings_by_station(&filter)?;

        let complete = !counts.is_empty()
            && counts
                .iter()
                .all(|c| c.count >= u64::from(HOURS_PER_DAY));

        if complete {
            debug!("{} already complete for {} station(s)", date, counts.len());
            return Ok(BackfillReport::new(date, BackfillState::Complete));
        }

        let incomplete = counts
            .iter()
            .filter(|c| c.count < u64::from(HOURS_PER_DAY))
            .count();
        info!(
            "Backfilling {} ({} of {} station(s) incomplete)",
            date,
            incomplete,
            counts.len()
        );

        let mut report = BackfillReport::new(date, BackfillState::Filled);

        for hour in 0..HOURS_PER_DAY {
            report.api_calls += 1;

            match self.source.fetch(date, hour, 0).await {
                Ok(response) => {
                    let summary = ingest(self.store, &response);
                    report.stations_inserted += summary.stations_inserted;
                    report.readings_inserted += summary.readings_inserted;
                }
                Err(e) => {
                    warn!("Could not retrieve {} {:02}:00: {}", date, hour, e);
                    report.failures.push(HourFailure {
                        hour,
                        message: e.to_string(),
                    });
                }
            }

            if let Some(progress) = self.progress {
                progress(SweepProgress {
                    date,
                    hour,
                    completed: hour + 1,
                    total: HOURS_PER_DAY,
                });
            }
        }

        info!(
            "Backfilled {}: {} reading(s) inserted, {} hour(s) failed",
            date,
            report.readings_inserted,
            report.failures.len()
        );

        Ok(report)
    }

    /// Check every day of a month that lies after `earliest` and before
    /// `today`.
    pub async fn ensure_month_complete(
        &self,
        year: i32,
        month: Month,
        earliest: Date,
        today: Date,
    ) -> Result<Vec<BackfillReport>> {
        let last = last_day_of_month(year, month)?;
        let mut day = Date::from_calendar_date(year, month, 1)
            .map_err(|e| Error::InvalidCalendarDate(e.to_string()))?;
        let mut reports = Vec::new();

        loop {
            if day > earliest && day < today {
                reports.push(self.ensure_day_complete(day, None).await?);
            } else {
                debug!("Skipping {} outside the available range", day);
            }

            if day >= last {
                break;
            }
            day = day.next_day().ok_or_else(|| {
                Error::InvalidCalendarDate(format!("no day after {}", day))
            })?;
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWeatherSource;
    use sgtemp_types::{Reading, ReadingTimestamp, Station};
    use std::cell::RefCell;
    use time::macros::date;

    const DAY: Date = date!(2021 - 03 - 01);

    fn clementi() -> Station {
        Station::from_coordinates("S50", "Clementi Road", 1.3337, 103.7768)
    }

    fn changi() -> Station {
        Station::from_coordinates("S24", "Upper Changi Road North", 1.3678, 103.9826)
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2020, Month::February).unwrap(),
            date!(2020 - 02 - 29)
        );
        assert_eq!(
            last_day_of_month(2021, Month::February).unwrap(),
            date!(2021 - 02 - 28)
        );
        assert_eq!(
            last_day_of_month(2021, Month::December).unwrap(),
            date!(2021 - 12 - 31)
        );
        assert_eq!(
            last_day_of_month(2021, Month::April).unwrap(),
            date!(2021 - 04 - 30)
        );
    }

    #[test]
    fn test_into_partial_failure() {
        let mut report = BackfillReport::new(DAY, BackfillState::Filled);
        assert!(report.clone().into_partial_failure().is_ok());

        report.failures.push(HourFailure {
            hour: 2,
            message: "down".to_string(),
        });
        assert!(!report.is_clean());
        assert!(matches!(
            report.into_partial_failure(),
            Err(Error::PartialBackfillFailure { .. })
        ));
    }

    #[test]
    fn test_ingest_skips_rows_that_fail_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.db");
        let store = Store::open(&path).unwrap();

        // Reject every reading for one station at the database level
        let other = rusqlite::Connection::open(&path).unwrap();
        other
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON readings
                 WHEN NEW.station_id = 'BAD'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        drop(other);

        let timestamp = ReadingTimestamp::on_the_hour(DAY, 10).unwrap();
        let response = FetchResponse {
            timestamp,
            stations: vec![
                clementi(),
                Station::from_coordinates("BAD", "Broken Station", 1.3, 103.8),
            ],
            readings: vec![
                Reading {
                    station_id: "BAD".to_string(),
                    timestamp,
                    value: 20.0,
                },
                Reading {
                    station_id: "S50".to_string(),
                    timestamp,
                    value: 27.4,
                },
            ],
        };

        let summary = ingest(&store, &response);
        assert_eq!(summary.stations_inserted, 2);
        assert_eq!(summary.readings_inserted, 1);
        assert_eq!(store.count_readings(&ReadingFilter::new()).unwrap(), 1);
        assert_eq!(
            store
                .count_readings(&ReadingFilter::new().station("S50"))
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_day_is_swept() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(DAY, "S50", 25.0);

        let report = Backfiller::new(&source, &store)
            .ensure_day_complete(DAY, None)
            .await
            .unwrap();

        assert_eq!(report.state, BackfillState::Filled);
        assert_eq!(report.api_calls, 24);
        assert_eq!(report.readings_inserted, 24);
        assert_eq!(report.stations_inserted, 1);
        assert!(report.is_clean());
        assert_eq!(source.call_count(), 24);
    }

    #[tokio::test]
    async fn test_complete_day_makes_no_calls() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(DAY, "S50", 25.0);
        let backfiller = Backfiller::new(&source, &store);

        backfiller.ensure_day_complete(DAY, None).await.unwrap();
        source.reset_calls().await;

        let report = backfiller.ensure_day_complete(DAY, None).await.unwrap();
        assert_eq!(report.state, BackfillState::Complete);
        assert_eq!(report.api_calls, 0);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_station_triggers_full_resweep() {
        let store = Store::open_in_memory().unwrap();
        store.insert_station_if_absent(&clementi()).unwrap();
        store.insert_station_if_absent(&changi()).unwrap();
        for hour in 0..24 {
            store
                .insert_reading_if_absent(&Reading {
                    station_id: "S50".to_string(),
                    timestamp: ReadingTimestamp::on_the_hour(DAY, hour).unwrap(),
                    value: 25.0,
                })
                .unwrap();
        }
        store
            .insert_reading_if_absent(&Reading {
                station_id: "S24".to_string(),
                timestamp: ReadingTimestamp::on_the_hour(DAY, 0).unwrap(),
                value: 26.0,
            })
            .unwrap();

        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_station(changi())
            .with_full_day(DAY, "S50", 30.0)
            .with_full_day(DAY, "S24", 26.0);

        let report = Backfiller::new(&source, &store)
            .ensure_day_complete(DAY, None)
            .await
            .unwrap();

        assert_eq!(report.api_calls, 24);
        assert_eq!(report.readings_inserted, 23);
        assert_eq!(report.stations_inserted, 0);
    }

    #[tokio::test]
    async fn test_station_filter_limits_completeness_check() {
        let store = Store::open_in_memory().unwrap();
        let mut source = MockWeatherSource::new()
            .with_station(clementi())
            .with_station(changi())
            .with_full_day(DAY, "S50", 25.0);
        for hour in 0..12 {
            let ts = ReadingTimestamp::on_the_hour(DAY, hour).unwrap();
            source = source.with_reading("S24", ts, 27.0);
        }
        let backfiller = Backfiller::new(&source, &store);

        backfiller.ensure_day_complete(DAY, None).await.unwrap();
        source.reset_calls().await;

        let report = backfiller.ensure_day_complete(DAY, Some("S50")).await.unwrap();
        assert_eq!(report.state, BackfillState::Complete);
        assert_eq!(source.call_count(), 0);

        let report = backfiller.ensure_day_complete(DAY, None).await.unwrap();
        assert_eq!(report.state, BackfillState::Filled);
        assert_eq!(source.call_count(), 24);
    }

    #[tokio::test]
    async fn test_failed_hours_are_recorded() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(DAY, "S50", 25.0)
            .with_failing_hours(DAY, &[3, 17]);

        let report = Backfiller::new(&source, &store)
            .ensure_day_complete(DAY, None)
            .await
            .unwrap();

        assert_eq!(report.api_calls, 24);
        assert_eq!(report.readings_inserted, 22);
        let hours: Vec<u8> = report.failures.iter().map(|f| f.hour).collect();
        assert_eq!(hours, vec![3, 17]);
    }

    #[tokio::test]
    async fn test_progress_callback() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new().with_full_day(DAY, "S50", 25.0);
        let seen = RefCell::new(Vec::new());
        let record = |p: SweepProgress| seen.borrow_mut().push(p.completed);

        Backfiller::new(&source, &store)
            .with_progress(&record)
            .ensure_day_complete(DAY, None)
            .await
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 24);
        assert_eq!(seen.last(), Some(&24));
    }

    #[tokio::test]
    async fn test_month_skips_out_of_range_days() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();

        let reports = Backfiller::new(&source, &store)
            .ensure_month_complete(
                2016,
                Month::December,
                date!(2016 - 12 - 14),
                date!(2016 - 12 - 20),
            )
            .await
            .unwrap();

        let days: Vec<u8> = reports.iter().map(|r| r.date.day()).collect();
        assert_eq!(days, vec![15, 16, 17, 18, 19]);
        assert_eq!(source.call_count(), 5 * 24);
    }
}
