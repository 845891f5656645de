//! Single-pass order statistics.
//!
//! [`StatisticsAccumulator`] consumes readings sorted by value ascending (ties
//! broken by station name, then timestamp) and produces count, mean, median
//! and both extrema with every tied occurrence. The total must be known up
//! front so the median positions can be captured during the pass.

use sgtemp_types::{Extremum, ExtremumOccurrence, OrderedReading, StatisticsResult};

use crate::error::{Error, Result};

/// Running state of a statistics pass.
#[derive(Debug, Clone)]
pub struct StatisticsAccumulator {
    expected: u64,
    position: u64,
    sum: f64,
    lower_mid: Option<f64>,
    upper_mid: Option<f64>,
    minimum: Option<Extremum>,
    maximum: Option<Extremum>,
}

impl StatisticsAccumulator {
    /// Start a pass over `expected` readings.
    pub fn new(expected: u64) -> Self {
        Self {
            expected,
            position: 0,
            sum: 0.0,
            lower_mid: None,
            upper_mid: None,
            minimum: None,
            maximum: None,
        }
    }

    /// Feed the next reading in value order.
    pub fn push(&mut self, reading: &OrderedReading) {
        self.position += 1;
        self.sum += reading.value;

        let half = self.expected / 2;
        if self.position == half {
            self.lower_mid = Some(reading.value);
        }
        if self.position == half + 1 {
            self.upper_mid = Some(reading.value);
        }

        let occurrence = || ExtremumOccurrence {
            timestamp: reading.timestamp,
            station_name: reading.station_name.clone(),
        };

        match &mut self.maximum {
            Some(max) if reading.value > max.value => {
                max.value = reading.value;
                max.occurrences = vec![occurrence()];
            }
            Some(max) if reading.value == max.value => max.occurrences.push(occurrence()),
            Some(_) => {}
            None => {
                self.maximum = Some(Extremum {
                    value: reading.value,
                    occurrences: vec![occurrence()],
                });
            }
        }

        match &mut self.minimum {
            Some(min) if reading.value < min.value => {
                min.value = reading.value;
                min.occurrences = vec![occurrence()];
            }
            Some(min) if reading.value == min.value => min.occurrences.push(occurrence()),
            Some(_) => {}
            None => {
                self.minimum = Some(Extremum {
                    value: reading.value,
                    occurrences: vec![occurrence()],
                });
            }
        }
    }

    /// Number of readings seen so far.
    pub fn len(&self) -> u64 {
        self.position
    }

    /// Whether no reading has been pushed.
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Finish the pass.
    ///
    /// Fails with [`Error::EmptyResultSet`] when no reading was pushed and
    /// with [`Error::InconsistentScan`] when the number pushed differs from
    /// the expected total.
    pub fn finish(self) -> Result<StatisticsResult> {
        let (Some(minimum), Some(maximum)) = (self.minimum, self.maximum) else {
            return Err(Error::EmptyResultSet);
        };

        let mismatch = Error::InconsistentScan {
            expected: self.expected,
            scanned: self.position,
        };
        if self.position != self.expected {
            return Err(mismatch);
        }

        let median = match (self.expected % 2, self.lower_mid, self.upper_mid) {
            (0, Some(lower), Some(upper)) => (lower + upper) / 2.0,
            (1, _, Some(upper)) => upper,
            _ => return Err(mismatch),
        };

        Ok(StatisticsResult {
            count: self.position,
            mean: self.sum / self.position as f64,
            median,
            minimum,
            maximum,
        })
    }
}

/// Compute statistics over readings already sorted by value ascending.
pub fn compute_statistics(readings: &[OrderedReading]) -> Result<StatisticsResult> {
    let mut acc = StatisticsAccumulator::new(readings.len() as u64);
    for reading in readings {
        acc.push(reading);
    }
    acc.finish()
}
