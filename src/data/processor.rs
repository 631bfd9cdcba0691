//! Data Processor Module
//! Inclusive date ranges and date-range filtering of typed tables.

use super::record::{Record, Table};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Date format of the source CSVs and the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid date range: end {end} is before start {start}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the range.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Date at `offset` days after the start.
    pub fn date_at(&self, offset: i64) -> NaiveDate {
        self.start + Duration::days(offset)
    }

}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

/// Handles row selection over typed tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows whose date lies in `range` (both ends inclusive), in source order.
    pub fn filter_by_date<R: Record>(table: &Table<R>, range: &DateRange) -> Table<R> {
        table
            .rows()
            .iter()
            .filter(|row| range.contains(row.date()))
            .cloned()
            .collect()
    }
}
