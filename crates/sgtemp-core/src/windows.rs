//! Statistics windows and the request entry points.
//!
//! [`WindowSelector`] validates raw user input, runs the completeness checks a
//! window needs, and computes statistics over the stored readings:
//!
//! | Window | Validation | Backfill | Readings |
//! |--------|------------|----------|----------|
//! | Day | date, at most yesterday | that day | hourly slots of the day |
//! | Month | year-month, not after the current month | every day after the earliest date and before today | hourly slots of the month |
//! | All time | none | none | every stored reading |

use std::fmt;

use serde::Serialize;
use time::Date;
use tracing::{debug, info};

use sgtemp_store::{Column, ReadingFilter, ReadingOrder, Store};
use sgtemp_types::{
    OrderedReading, ReadingTimestamp, StatisticsResult, Station, format_date,
};

use crate::backfill::{Backfiller, BackfillReport, IngestSummary, SweepProgress, ingest};
use crate::error::{Error, Result};
use crate::statistics::StatisticsAccumulator;
use crate::traits::WeatherSource;
use crate::validation::{
    Clock, EARLIEST_AVAILABLE, is_at_most_yesterday, is_before_now, validate_date,
    validate_time, validate_year_month,
};

/// The span of time statistics were computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Window {
    Day { date: Date },
    Month { year: i32, month: u8 },
    AllTime,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Day { date } => write!(f, "{}", format_date(*date)),
            Window::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Window::AllTime => write!(f, "all time"),
        }
    }
}

impl Window {
    /// Stored readings that belong to the window.
    ///
    /// Day and month windows only cover the top-of-the-hour slots.
    pub fn filter(&self, station: Option<&str>) -> ReadingFilter {
        let filter = match *self {
            Window::Day { date } => ReadingFilter::new().date(date).hourly(),
            Window::Month { year, month } => match time::Month::try_from(month) {
                Ok(month) => ReadingFilter::new().year_month(year, month).hourly(),
                // A month outside 1..=12 matches nothing
                Err(_) => ReadingFilter::new().is_in(Column::Month, Vec::<String>::new()),
            },
            Window::AllTime => ReadingFilter::new(),
        };
        filter.station_opt(station)
    }
}

/// Statistics for a window, with the backfill work done to get them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistics {
    pub window: Window,
    pub station: Option<String>,
    pub statistics: StatisticsResult,
    pub backfill: Vec<BackfillReport>,
}

impl WindowStatistics {
    /// Number of hours that could not be retrieved across all days.
    pub fn failed_hours(&self) -> usize {
        self.backfill.iter().map(|r| r.failures.len()).sum()
    }
}

/// Result of a point-in-time fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFetch {
    /// Slot that was asked for.
    pub requested: ReadingTimestamp,
    /// Slot the source answered with.
    pub reported: ReadingTimestamp,
    pub ingested: IngestSummary,
    /// Stored readings at the reported slot, by station name.
    pub readings: Vec<OrderedReading>,
}

/// Entry point for every statistics and retrieval request.
pub struct WindowSelector<'a, S: WeatherSource + ?Sized> {
    source: &'a S,
    store: &'a Store,
    clock: Clock,
    progress: Option<&'a dyn Fn(SweepProgress)>,
}

impl<'a, S: WeatherSource + ?Sized> WindowSelector<'a, S> {
    pub fn new(source: &'a S, store: &'a Store) -> Self {
        Self {
            source,
            store,
            clock: Clock::System,
            progress: None,
        }
    }

    /// Use `clock` as the source of "now".
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Report sweep progress to `progress`.
    pub fn with_progress(mut self, progress: &'a dyn Fn(SweepProgress)) -> Self {
        self.progress = Some(progress);
        self
    }

    fn backfiller(&self) -> Backfiller<'a, S> {
        let backfiller = Backfiller::new(self.source, self.store);
        match self.progress {
            Some(progress) => backfiller.with_progress(progress),
            None => backfiller,
        }
    }

    /// Statistics for one day's hourly readings.
    ///
    /// The date must be at most yesterday. The day is backfilled first when
    /// any present station lacks hourly readings.
    pub async fn daily_statistics(
        &self,
        date_input: &str,
        station: Option<&str>,
    ) -> Result<WindowStatistics> {
        let today = self.clock.today();
        let date = validate_date(date_input, today)?;

        if !is_at_most_yesterday(date, today) {
            return Err(Error::FutureTimestampRejected {
                requested: format_date(date),
                limit: format_date(today),
            });
        }

        let report = self.backfiller().ensure_day_complete(date, station).await?;

        let window = Window::Day { date };
        let statistics = compute_window(self.store, &window.filter(station))?;

        Ok(WindowStatistics {
            window,
            station: station.map(str::to_string),
            statistics,
            backfill: vec![report],
        })
    }

    /// Statistics for a month's hourly readings.
    ///
    /// Months after the current one are rejected. Every day after the
    /// earliest available date and before today is backfilled as needed.
    pub async fn monthly_statistics(
        &self,
        year_month_input: &str,
        station: Option<&str>,
    ) -> Result<WindowStatistics> {
        let today = self.clock.today();
        let (year, month) = validate_year_month(year_month_input, today)?;

        if (year, month as u8) > (today.year(), today.month() as u8) {
            return Err(Error::FutureTimestampRejected {
                requested: format!("{:04}-{:02}", year, month as u8),
                limit: format!("{:04}-{:02}", today.year(), today.month() as u8),
            });
        }

        let reports = self
            .backfiller()
            .ensure_month_complete(year, month, EARLIEST_AVAILABLE, today)
            .await?;

        let window = Window::Month {
            year,
            month: month as u8,
        };
        let statistics = compute_window(self.store, &window.filter(station))?;

        Ok(WindowStatistics {
            window,
            station: station.map(str::to_string),
            statistics,
            backfill: reports,
        })
    }

    /// Statistics over every stored reading, without any backfill.
    pub fn all_time_statistics(&self, station: Option<&str>) -> Result<WindowStatistics> {
        let window = Window::AllTime;
        let statistics = compute_window(self.store, &window.filter(station))?;

        Ok(WindowStatistics {
            window,
            station: station.map(str::to_string),
            statistics,
            backfill: Vec::new(),
        })
    }

    /// Retrieve and store the readings for one point in time.
    ///
    /// The timestamp must be strictly before now. The source may answer with
    /// a different (nearest available) slot; the returned readings are the
    /// stored ones at that slot.
    pub async fn fetch_point(&self, date_input: &str, time_input: &str) -> Result<PointFetch> {
        let now = self.clock.now();
        let date = validate_date(date_input, now.date())?;
        let (hour, minute) = validate_time(time_input, now.time())?;

        if !is_before_now(date, hour, minute, now) {
            return Err(Error::FutureTimestampRejected {
                requested: format!("{} {:02}:{:02}", format_date(date), hour, minute),
                limit: format!(
                    "{} {:02}:{:02}",
                    format_date(now.date()),
                    now.hour(),
                    now.minute()
                ),
            });
        }

        let requested = ReadingTimestamp::new(date, hour, minute)
            .map_err(|e| Error::InvalidTime(e.to_string()))?;

        let response = self.source.fetch(date, hour, minute).await?;
        if response.timestamp != requested {
            info!(
                "Requested {} but the source answered with {}",
                requested, response.timestamp
            );
        }

        let ingested = ingest(self.store, &response);
        let readings = self.store.query_readings(
            &ReadingFilter::new().at(&response.timestamp),
            ReadingOrder::StationThenTime,
        )?;

        Ok(PointFetch {
            requested,
            reported: response.timestamp,
            ingested,
            readings,
        })
    }

    /// Every known station, by name.
    pub fn list_stations(&self) -> Result<Vec<Station>> {
        Ok(self.store.list_stations()?)
    }

    /// Stored readings matching `filter`, by station name then time.
    pub fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<OrderedReading>> {
        Ok(self
            .store
            .query_readings(filter, ReadingOrder::StationThenTime)?)
    }

    /// The readings a window's statistics were computed over, by value.
    pub fn window_readings(&self, result: &WindowStatistics) -> Result<Vec<OrderedReading>> {
        let filter = result.window.filter(result.station.as_deref());
        Ok(self
            .store
            .query_readings(&filter, ReadingOrder::ValueAscending)?)
    }

    /// Calendar date in the source zone.
    pub fn today(&self) -> Date {
        self.clock.today()
    }
}

/// Count, then scan in value order through a single accumulator.
fn compute_window(store: &Store, filter: &ReadingFilter) -> Result<StatisticsResult> {
    let total = store.count_readings(filter)?;
    if total == 0 {
        return Err(Error::EmptyResultSet);
    }

    debug!("Computing statistics over {} reading(s)", total);

    let mut acc = StatisticsAccumulator::new(total);
    store.scan_readings_ordered(filter, ReadingOrder::ValueAscending, |reading| {
        acc.push(&reading)
    })?;
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWeatherSource;
    use sgtemp_types::Reading;
    use time::Month;
    use time::macros::{date, datetime};

    const NOW: Clock = Clock::Fixed(datetime!(2021 - 03 - 10 12:30));

    fn clementi() -> Station {
        Station::from_coordinates("S50", "Clementi Road", 1.3337, 103.7768)
    }

    #[tokio::test]
    async fn test_daily_rejects_today() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        let result = selector.daily_statistics("2021-03-10", None).await;
        assert!(matches!(result, Err(Error::FutureTimestampRejected { .. })));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_daily_invalid_input_never_fetches() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        assert!(matches!(
            selector.daily_statistics("2016-12-13", None).await,
            Err(Error::BeforeEarliestAvailable { .. })
        ));
        assert!(matches!(
            selector.daily_statistics("2021-02-30", None).await,
            Err(Error::InvalidCalendarDate(_))
        ));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_daily_with_backfill() {
        let store = Store::open_in_memory().unwrap();
        let day = date!(2021 - 03 - 01);
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(day, "S50", 25.0);
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        let result = selector.daily_statistics("2021-03-01", None).await.unwrap();
        assert_eq!(result.window, Window::Day { date: day });
        assert_eq!(result.statistics.count, 24);
        assert_eq!(result.statistics.minimum.value, 25.0);
        assert_eq!(result.statistics.maximum.value, 27.3);
        assert_eq!(result.failed_hours(), 0);
    }

    #[tokio::test]
    async fn test_daily_empty_day() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        assert!(matches!(
            selector.daily_statistics("2021-03-01", None).await,
            Err(Error::EmptyResultSet)
        ));
        assert_eq!(source.call_count(), 24);
    }

    #[tokio::test]
    async fn test_monthly_rejects_future_month() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        assert!(matches!(
            selector.monthly_statistics("2021-04", None).await,
            Err(Error::FutureTimestampRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_monthly_current_month_stops_before_today() {
        let store = Store::open_in_memory().unwrap();
        let mut source = MockWeatherSource::new().with_station(clementi());
        for day in 1..=9 {
            let date = Date::from_calendar_date(2021, Month::March, day).unwrap();
            source = source.with_full_day(date, "S50", 20.0 + f64::from(day));
        }
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        let result = selector.monthly_statistics("2021-03", None).await.unwrap();
        assert_eq!(result.backfill.len(), 9);
        assert_eq!(result.statistics.count, 9 * 24);
        assert_eq!(result.statistics.minimum.value, 21.0);
        assert_eq!(source.call_count(), 9 * 24);
    }

    #[test]
    fn test_all_time_empty_store() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store);

        assert!(matches!(
            selector.all_time_statistics(None),
            Err(Error::EmptyResultSet)
        ));
    }

    #[test]
    fn test_all_time_includes_non_hourly_readings() {
        let store = Store::open_in_memory().unwrap();
        store.insert_station_if_absent(&clementi()).unwrap();
        let day = date!(2021 - 03 - 01);
        for (hour, minute, value) in [(0, 0, 25.0), (0, 5, 26.0), (1, 0, 27.0)] {
            store
                .insert_reading_if_absent(&Reading {
                    station_id: "S50".to_string(),
                    timestamp: ReadingTimestamp::new(day, hour, minute).unwrap(),
                    value,
                })
                .unwrap();
        }

        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store);
        let result = selector.all_time_statistics(Some("S50")).unwrap();
        assert_eq!(result.statistics.count, 3);
        assert_eq!(result.statistics.median, 26.0);
        assert_eq!(result.window.to_string(), "all time");

        assert!(matches!(
            selector.all_time_statistics(Some("S999")),
            Err(Error::EmptyResultSet)
        ));
    }

    #[tokio::test]
    async fn test_fetch_point_uses_reported_slot() {
        let store = Store::open_in_memory().unwrap();
        let day = date!(2021 - 03 - 01);
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(day, "S50", 25.0);
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        let point = selector.fetch_point("2021-03-01", "10:17").await.unwrap();
        assert_eq!(point.requested.to_string(), "2021-03-01 10:17");
        assert_eq!(point.reported.to_string(), "2021-03-01 10:00");
        assert_eq!(point.readings.len(), 1);
        assert_eq!(point.readings[0].value, 26.0);
        assert_eq!(point.ingested.readings_inserted, 1);
    }

    #[tokio::test]
    async fn test_fetch_point_rejects_now_and_later() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        assert!(matches!(
            selector.fetch_point("2021-03-10", "12:30").await,
            Err(Error::FutureTimestampRejected { .. })
        ));
        assert!(matches!(
            selector.fetch_point("2021-03-10", "25:00").await,
            Err(Error::InvalidTime(_))
        ));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_point_no_data_is_fatal() {
        let store = Store::open_in_memory().unwrap();
        let source = MockWeatherSource::new();
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        assert!(matches!(
            selector.fetch_point("2021-03-01", "10:00").await,
            Err(Error::TransportFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_window_readings_by_value() {
        let store = Store::open_in_memory().unwrap();
        let day = date!(2021 - 03 - 01);
        let source = MockWeatherSource::new()
            .with_station(clementi())
            .with_full_day(day, "S50", 25.0)
            .with_reading("S50", ReadingTimestamp::new(day, 6, 30).unwrap(), 10.0);
        let selector = WindowSelector::new(&source, &store).with_clock(NOW);

        let result = selector.daily_statistics("2021-03-01", None).await.unwrap();
        selector.fetch_point("2021-03-01", "06:45").await.unwrap();

        let readings = selector.window_readings(&result).unwrap();
        assert_eq!(readings.len(), 24);
        assert_eq!(readings[0].value, 25.0);
        assert_eq!(readings[23].value, 27.3);
        assert!(readings.windows(2).all(|w| w[0].value <= w[1].value));
    }

    #[test]
    fn test_window_display() {
        assert_eq!(
            Window::Month {
                year: 2020,
                month: 2
            }
            .to_string(),
            "2020-02"
        );
    }
}
