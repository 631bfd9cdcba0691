//! Typed Records Module
//! Strongly typed rows for the daily and hourly rental tables.

use super::processor::DateRange;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Canonical column names of the frames built from typed tables.
pub const DATE_COL: &str = "date";
pub const SEASON_COL: &str = "season";
pub const TIME_OF_DAY_COL: &str = "time_of_day";
pub const REGISTERED_COL: &str = "registered";
pub const CASUAL_COL: &str = "casual";
pub const TOTAL_COL: &str = "total";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised {kind} label: {value:?}")]
pub struct CategoryError {
    pub kind: &'static str,
    pub value: String,
}

/// Season of the year as recorded in the daily table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = CategoryError;

    /// Accepts English labels, the Indonesian labels of the source dataset
    /// and the numeric season codes 1-4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" | "semi" | "musim semi" | "1" => Ok(Season::Spring),
            "summer" | "panas" | "musim panas" | "2" => Ok(Season::Summer),
            "fall" | "autumn" | "gugur" | "musim gugur" | "3" => Ok(Season::Fall),
            "winter" | "dingin" | "musim dingin" | "4" => Ok(Season::Winter),
            _ => Err(CategoryError {
                kind: "season",
                value: s.to_string(),
            }),
        }
    }
}

/// Time-of-day category of an hourly record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    /// Category of an hour of the day (0-23).
    ///
    /// Morning 05-11, afternoon 12-16, evening 17-20, night 21-04.
    pub fn from_hour(hour: u8) -> Option<TimeOfDay> {
        match hour {
            5..=11 => Some(TimeOfDay::Morning),
            12..=16 => Some(TimeOfDay::Afternoon),
            17..=20 => Some(TimeOfDay::Evening),
            21..=23 | 0..=4 => Some(TimeOfDay::Night),
            _ => None,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "pagi" => Ok(TimeOfDay::Morning),
            "afternoon" | "siang" => Ok(TimeOfDay::Afternoon),
            "evening" | "sore" => Ok(TimeOfDay::Evening),
            "night" | "malam" => Ok(TimeOfDay::Night),
            _ => Err(CategoryError {
                kind: "time of day",
                value: s.to_string(),
            }),
        }
    }
}

/// One row of the daily table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub season: Season,
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

/// One row of the hourly table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyRecord {
    pub date: NaiveDate,
    pub hour: Option<u8>,
    pub time_of_day: TimeOfDay,
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

/// Day number used for the date column of polars frames.
pub fn date_to_key(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

pub fn key_to_date(key: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(key)
}

/// A dated row with registered/casual/total counts.
pub trait Record: Clone {
    fn date(&self) -> NaiveDate;
    fn registered(&self) -> u64;
    fn casual(&self) -> u64;
    fn total(&self) -> u64;

    /// Build a frame with the canonical columns of this record type.
    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame>;
}

fn count_columns<R: Record>(rows: &[R]) -> [Column; 4] {
    [
        Column::new(
            DATE_COL.into(),
            rows.iter().map(|r| date_to_key(r.date())).collect::<Vec<i32>>(),
        ),
        Column::new(
            REGISTERED_COL.into(),
            rows.iter().map(|r| r.registered()).collect::<Vec<u64>>(),
        ),
        Column::new(
            CASUAL_COL.into(),
            rows.iter().map(|r| r.casual()).collect::<Vec<u64>>(),
        ),
        Column::new(
            TOTAL_COL.into(),
            rows.iter().map(|r| r.total()).collect::<Vec<u64>>(),
        ),
    ]
}

impl Record for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn registered(&self) -> u64 {
        self.registered
    }
    fn casual(&self) -> u64 {
        self.casual
    }
    fn total(&self) -> u64 {
        self.total
    }

    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame> {
        let mut columns = Vec::from(count_columns(rows));
        columns.push(Column::new(
            SEASON_COL.into(),
            rows.iter().map(|r| r.season.as_str()).collect::<Vec<&str>>(),
        ));
        DataFrame::new(columns)
    }
}

impl Record for HourlyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn registered(&self) -> u64 {
        self.registered
    }
    fn casual(&self) -> u64 {
        self.casual
    }
    fn total(&self) -> u64 {
        self.total
    }

    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame> {
        let mut columns = Vec::from(count_columns(rows));
        columns.push(Column::new(
            TIME_OF_DAY_COL.into(),
            rows.iter()
                .map(|r| r.time_of_day.as_str())
                .collect::<Vec<&str>>(),
        ));
        DataFrame::new(columns)
    }
}

/// Immutable, ordered collection of typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    rows: Vec<R>,
}

pub type DailyTable = Table<DailyRecord>;
pub type HourlyTable = Table<HourlyRecord>;

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: Record> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest date present, `None` for an empty table.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let min = self.rows.iter().map(R::date).min()?;
        let max = self.rows.iter().map(R::date).max()?;
        DateRange::new(min, max).ok()
    }

    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(R::total).sum()
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        R::to_frame(&self.rows)
    }
}

impl<R> FromIterator<R> for Table<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
