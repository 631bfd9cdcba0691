//! Aggregator Module
//! Group-by/sum aggregations over typed tables, delegated to Polars.

use crate::data::{
    key_to_date, CategoryError, DailyTable, HourlyTable, Record, Season, Table, TimeOfDay,
    CASUAL_COL, DATE_COL, REGISTERED_COL, SEASON_COL, TIME_OF_DAY_COL, TOTAL_COL,
};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unexpected key in grouped column: {0}")]
    InvalidKey(#[from] CategoryError),
    #[error("Missing value in grouped column {0:?}")]
    MissingValue(String),
    #[error("Date key {0} out of range")]
    InvalidDate(i32),
}

/// Sum of total rentals for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal<K> {
    pub key: K,
    pub total: u64,
}

pub type SeasonTotal = CategoryTotal<Season>;
pub type TimeOfDayTotal = CategoryTotal<TimeOfDay>;

/// One value of a date-grouped series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: u64,
}

/// Registered, casual and total sums for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBreakdown {
    pub date: NaiveDate,
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

/// Scalar dashboard metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

impl Metrics {
    pub fn from_series(registered: &[DatedValue], casual: &[DatedValue], total: &[DatedValue]) -> Self {
        let sum = |series: &[DatedValue]| -> u64 { series.iter().map(|v| v.value).sum() };
        Self {
            registered: sum(registered),
            casual: sum(casual),
            total: sum(total),
        }
    }

    /// Registered and casual shares in percent, `None` when there are no users.
    pub fn user_shares(&self) -> Option<(f64, f64)> {
        let users = self.registered + self.casual;
        if users == 0 {
            return None;
        }
        let registered = self.registered as f64 * 100.0 / users as f64;
        Some((registered, 100.0 - registered))
    }
}

/// Grouping and summation over rental tables.
pub struct Aggregator;

impl Aggregator {
    /// Group `frame` by `key_column` and sum every column in `value_columns`.
    ///
    /// One row per key observed in the input, sorted by key.
    pub fn aggregate_by(
        frame: &DataFrame,
        key_column: &str,
        value_columns: &[&str],
    ) -> Result<DataFrame, AggregateError> {
        let sums: Vec<Expr> = value_columns.iter().map(|c| col(*c).sum()).collect();

        let grouped = frame
            .clone()
            .lazy()
            .group_by([col(key_column)])
            .agg(sums)
            .sort_by_exprs([col(key_column)], SortMultipleOptions::default())
            .collect()?;

        Ok(grouped)
    }

    pub fn season_totals(daily: &DailyTable) -> Result<Vec<SeasonTotal>, AggregateError> {
        Self::category_totals(daily, SEASON_COL)
    }

    pub fn time_of_day_totals(hourly: &HourlyTable) -> Result<Vec<TimeOfDayTotal>, AggregateError> {
        Self::category_totals(hourly, TIME_OF_DAY_COL)
    }

    pub fn registered_by_date<R: Record>(table: &Table<R>) -> Result<Vec<DatedValue>, AggregateError> {
        Self::series_by_date(table, REGISTERED_COL)
    }

    pub fn casual_by_date<R: Record>(table: &Table<R>) -> Result<Vec<DatedValue>, AggregateError> {
        Self::series_by_date(table, CASUAL_COL)
    }

    pub fn total_by_date<R: Record>(table: &Table<R>) -> Result<Vec<DatedValue>, AggregateError> {
        Self::series_by_date(table, TOTAL_COL)
    }

    /// All three sums per date, in chronological order.
    pub fn date_breakdown<R: Record>(table: &Table<R>) -> Result<Vec<DateBreakdown>, AggregateError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let grouped = Self::aggregate_by(
            &table.to_frame()?,
            DATE_COL,
            &[REGISTERED_COL, CASUAL_COL, TOTAL_COL],
        )?;
        let dates = Self::date_keys(&grouped)?;
        let registered = Self::sums(&grouped, REGISTERED_COL)?;
        let casual = Self::sums(&grouped, CASUAL_COL)?;
        let total = Self::sums(&grouped, TOTAL_COL)?;

        Ok(dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| DateBreakdown {
                date,
                registered: registered[i],
                casual: casual[i],
                total: total[i],
            })
            .collect())
    }

    /// Pad category totals with zero rows so every category in `all` appears, in `all` order.
    pub fn fill_categories<K: Copy + PartialEq>(
        all: &[K],
        totals: &[CategoryTotal<K>],
    ) -> Vec<CategoryTotal<K>> {
        all.iter()
            .map(|key| CategoryTotal {
                key: *key,
                total: totals
                    .iter()
                    .find(|t| t.key == *key)
                    .map(|t| t.total)
                    .unwrap_or(0),
            })
            .collect()
    }

    fn category_totals<R, K>(
        table: &Table<R>,
        key_column: &str,
    ) -> Result<Vec<CategoryTotal<K>>, AggregateError>
    where
        R: Record,
        K: FromStr<Err = CategoryError> + Ord,
    {
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let grouped = Self::aggregate_by(&table.to_frame()?, key_column, &[TOTAL_COL])?;
        let keys = grouped.column(key_column)?.cast(&DataType::String)?;
        let keys = keys.str()?;
        let totals = Self::sums(&grouped, TOTAL_COL)?;

        let mut rows = keys
            .into_iter()
            .zip(totals)
            .map(|(key, total)| -> Result<CategoryTotal<K>, AggregateError> {
                let key = key.ok_or_else(|| AggregateError::MissingValue(key_column.to_string()))?;
                Ok(CategoryTotal {
                    key: key.parse::<K>()?,
                    total,
                })
            })
            .collect::<Result<Vec<_>, AggregateError>>()?;

        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    fn series_by_date<R: Record>(
        table: &Table<R>,
        value_column: &str,
    ) -> Result<Vec<DatedValue>, AggregateError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let grouped = Self::aggregate_by(&table.to_frame()?, DATE_COL, &[value_column])?;
        let dates = Self::date_keys(&grouped)?;
        let values = Self::sums(&grouped, value_column)?;

        Ok(dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| DatedValue { date, value })
            .collect())
    }

    fn date_keys(grouped: &DataFrame) -> Result<Vec<NaiveDate>, AggregateError> {
        let keys = grouped.column(DATE_COL)?.cast(&DataType::Int32)?;
        keys.i32()?
            .into_iter()
            .map(|key| -> Result<NaiveDate, AggregateError> {
                let key = key.ok_or_else(|| AggregateError::MissingValue(DATE_COL.to_string()))?;
                key_to_date(key).ok_or(AggregateError::InvalidDate(key))
            })
            .collect()
    }

    fn sums(grouped: &DataFrame, column: &str) -> Result<Vec<u64>, AggregateError> {
        let values = grouped.column(column)?.cast(&DataType::UInt64)?;
        values
            .u64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| AggregateError::MissingValue(column.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DailyRecord, HourlyRecord};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(date: NaiveDate, season: Season, registered: u64, casual: u64) -> DailyRecord {
        DailyRecord {
            date,
            season,
            registered,
            casual,
            total: registered + casual,
        }
    }

    fn hourly(date: NaiveDate, time_of_day: TimeOfDay, registered: u64, casual: u64) -> HourlyRecord {
        HourlyRecord {
            date,
            hour: None,
            time_of_day,
            registered,
            casual,
            total: registered + casual,
        }
    }

    fn sample_daily() -> DailyTable {
        DailyTable::new(vec![
            daily(day(2011, 1, 1), Season::Spring, 10, 5),
            daily(day(2011, 1, 2), Season::Spring, 20, 8),
            daily(day(2011, 6, 1), Season::Summer, 100, 40),
            daily(day(2011, 12, 24), Season::Winter, 50, 2),
        ])
    }

    #[test]
    fn season_totals_only_include_observed_seasons() {
        let totals = Aggregator::season_totals(&sample_daily()).unwrap();
        assert_eq!(
            totals,
            vec![
                SeasonTotal { key: Season::Spring, total: 43 },
                SeasonTotal { key: Season::Summer, total: 140 },
                SeasonTotal { key: Season::Winter, total: 52 },
            ]
        );
    }

    #[test]
    fn season_totals_conserve_the_total_column() {
        let table = sample_daily();
        let totals = Aggregator::season_totals(&table).unwrap();
        let sum: u64 = totals.iter().map(|t| t.total).sum();
        assert_eq!(sum, table.total_count());
    }

    #[test]
    fn time_of_day_totals_group_hourly_rows() {
        let table = HourlyTable::new(vec![
            hourly(day(2011, 1, 1), TimeOfDay::Night, 1, 1),
            hourly(day(2011, 1, 1), TimeOfDay::Morning, 5, 1),
            hourly(day(2011, 1, 1), TimeOfDay::Night, 2, 0),
            hourly(day(2011, 1, 2), TimeOfDay::Evening, 9, 3),
        ]);
        let totals = Aggregator::time_of_day_totals(&table).unwrap();
        assert_eq!(
            totals,
            vec![
                TimeOfDayTotal { key: TimeOfDay::Morning, total: 6 },
                TimeOfDayTotal { key: TimeOfDay::Evening, total: 12 },
                TimeOfDayTotal { key: TimeOfDay::Night, total: 4 },
            ]
        );
        let sum: u64 = totals.iter().map(|t| t.total).sum();
        assert_eq!(sum, table.total_count());
    }

    #[test]
    fn date_series_are_chronological_and_additive() {
        let table = DailyTable::new(vec![
            daily(day(2011, 1, 3), Season::Spring, 3, 1),
            daily(day(2011, 1, 1), Season::Spring, 10, 5),
        ]);
        let registered = Aggregator::registered_by_date(&table).unwrap();
        assert_eq!(registered[0], DatedValue { date: day(2011, 1, 1), value: 10 });
        assert_eq!(registered[1], DatedValue { date: day(2011, 1, 3), value: 3 });

        for row in Aggregator::date_breakdown(&table).unwrap() {
            assert_eq!(row.registered + row.casual, row.total);
        }
    }

    #[test]
    fn hourly_rows_collapse_per_date() {
        let table = HourlyTable::new(vec![
            hourly(day(2011, 1, 1), TimeOfDay::Morning, 5, 1),
            hourly(day(2011, 1, 1), TimeOfDay::Evening, 7, 2),
        ]);
        let breakdown = Aggregator::date_breakdown(&table).unwrap();
        assert_eq!(
            breakdown,
            vec![DateBreakdown {
                date: day(2011, 1, 1),
                registered: 12,
                casual: 3,
                total: 15,
            }]
        );
    }

    #[test]
    fn empty_tables_yield_empty_aggregations_and_zero_metrics() {
        let empty = DailyTable::default();
        assert!(Aggregator::season_totals(&empty).unwrap().is_empty());
        assert!(Aggregator::total_by_date(&empty).unwrap().is_empty());
        assert!(Aggregator::date_breakdown(&empty).unwrap().is_empty());
        assert!(Aggregator::time_of_day_totals(&HourlyTable::default())
            .unwrap()
            .is_empty());

        let metrics = Metrics::from_series(&[], &[], &[]);
        assert_eq!(metrics, Metrics::default());
        assert_eq!(metrics.user_shares(), None);
    }

    #[test]
    fn generic_aggregate_sums_several_columns() {
        let frame = sample_daily().to_frame().unwrap();
        let grouped =
            Aggregator::aggregate_by(&frame, SEASON_COL, &[REGISTERED_COL, CASUAL_COL]).unwrap();
        assert_eq!(grouped.height(), 3);
        assert_eq!(grouped.width(), 3);
    }

    #[test]
    fn fill_categories_adds_zero_rows_in_canonical_order() {
        let observed = vec![SeasonTotal { key: Season::Fall, total: 7 }];
        let filled = Aggregator::fill_categories(&Season::ALL, &observed);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[0], SeasonTotal { key: Season::Spring, total: 0 });
        assert_eq!(filled[2], SeasonTotal { key: Season::Fall, total: 7 });
    }

    #[test]
    fn user_shares_are_percentages() {
        let metrics = Metrics {
            registered: 75,
            casual: 25,
            total: 100,
        };
        let (registered, casual) = metrics.user_shares().unwrap();
        assert!((registered - 75.0).abs() < 1e-9);
        assert!((casual - 25.0).abs() < 1e-9);
    }
}
