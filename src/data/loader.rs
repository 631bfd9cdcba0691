//! CSV Data Loader Module
//! Reads the daily and hourly rental CSVs with Polars and validates them into typed tables.

use super::processor::{parse_date, DateRange};
use super::record::{
    CategoryError, DailyRecord, DailyTable, HourlyRecord, HourlyTable, Season, TimeOfDay,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DAILY_FILE: &str = "df_day.csv";
pub const DEFAULT_HOURLY_FILE: &str = "df_hour.csv";

/// Column names of the source CSV files.
pub mod columns {
    pub const DATE: &str = "dateday";
    pub const SEASON: &str = "season";
    pub const TIME_CATEGORY: &str = "kategori_waktu";
    pub const HOUR: &str = "hr";
    pub const REGISTERED: &str = "registered";
    pub const CASUAL: &str = "casual";
    pub const TOTAL: &str = "count_cr";
}

const DAILY: &str = "daily";
const HOURLY: &str = "hourly";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("{table} table: missing column {column:?}")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("{table} table: missing or non-numeric value in column {column:?} at row {row}")]
    MissingValue {
        table: &'static str,
        column: &'static str,
        row: usize,
    },
    #[error("{table} table: invalid date {value:?} at row {row}")]
    InvalidDate {
        table: &'static str,
        row: usize,
        value: String,
    },
    #[error("{table} table: row {row}: {source}")]
    InvalidCategory {
        table: &'static str,
        row: usize,
        #[source]
        source: CategoryError,
    },
    #[error("{table} table: hour {value} out of range at row {row}")]
    InvalidHour {
        table: &'static str,
        row: usize,
        value: u64,
    },
    #[error("{table} table: negative value {value} in column {column:?} at row {row}")]
    NegativeCount {
        table: &'static str,
        column: &'static str,
        row: usize,
        value: i64,
    },
    #[error("{table} table: row {row}: registered ({registered}) + casual ({casual}) != total ({total})")]
    CountMismatch {
        table: &'static str,
        row: usize,
        registered: u64,
        casual: u64,
        total: u64,
    },
    #[error("daily table: date {0} appears more than once")]
    DuplicateDate(NaiveDate),
}

/// Location of the two source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub data_dir: PathBuf,
    pub daily_file: String,
    pub hourly_file: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            daily_file: DEFAULT_DAILY_FILE.to_string(),
            hourly_file: DEFAULT_HOURLY_FILE.to_string(),
        }
    }
}

impl DataSources {
    pub fn daily_path(&self) -> PathBuf {
        self.data_dir.join(&self.daily_file)
    }

    pub fn hourly_path(&self) -> PathBuf {
        self.data_dir.join(&self.hourly_file)
    }

    /// Same file names, different directory.
    pub fn with_data_dir(&self, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..self.clone()
        }
    }
}

/// Both source tables, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub daily: DailyTable,
    pub hourly: HourlyTable,
}

impl Datasets {
    /// Selectable date bounds: the earliest and latest day of the daily table.
    pub fn date_bounds(&self) -> Option<DateRange> {
        self.daily.date_bounds()
    }
}

/// Counts shared by both tables, validated per row.
struct CountColumns {
    registered: Vec<u64>,
    casual: Vec<u64>,
    total: Vec<u64>,
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    sources: DataSources,
}

impl DataLoader {
    pub fn new(sources: DataSources) -> Self {
        Self { sources }
    }

    /// Load and validate both tables.
    pub fn load(&self) -> Result<Datasets, LoaderError> {
        let daily = Self::load_daily(&self.sources.daily_path())?;
        let hourly = Self::load_hourly(&self.sources.hourly_path())?;
        Ok(Datasets { daily, hourly })
    }

    pub fn load_daily(path: &Path) -> Result<DailyTable, LoaderError> {
        let df = Self::read_csv(path)?;
        let table = Self::daily_from_frame(&df)?;
        info!(path = %path.display(), rows = table.len(), "loaded daily table");
        Ok(table)
    }

    pub fn load_hourly(path: &Path) -> Result<HourlyTable, LoaderError> {
        let df = Self::read_csv(path)?;
        let table = Self::hourly_from_frame(&df)?;
        info!(path = %path.display(), rows = table.len(), "loaded hourly table");
        Ok(table)
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        debug!(path = %path.display(), rows = df.height(), columns = df.width(), "read csv");
        Ok(df)
    }

    /// Validate a daily frame with the source column names.
    pub fn daily_from_frame(df: &DataFrame) -> Result<DailyTable, LoaderError> {
        let dates = Self::date_values(df, DAILY)?;
        let seasons = Self::string_values(df, DAILY, columns::SEASON)?;
        let counts = Self::count_values(df, DAILY)?;

        let mut seen = HashSet::with_capacity(dates.len());
        let mut rows = Vec::with_capacity(dates.len());

        for (i, date) in dates.into_iter().enumerate() {
            let row = i + 1;
            if !seen.insert(date) {
                return Err(LoaderError::DuplicateDate(date));
            }
            let season = seasons[i]
                .parse::<Season>()
                .map_err(|source| LoaderError::InvalidCategory {
                    table: DAILY,
                    row,
                    source,
                })?;

            rows.push(DailyRecord {
                date,
                season,
                registered: counts.registered[i],
                casual: counts.casual[i],
                total: counts.total[i],
            });
        }

        Ok(DailyTable::new(rows))
    }

    /// Validate an hourly frame with the source column names.
    ///
    /// The time-of-day category comes from `kategori_waktu` when present and
    /// is otherwise derived from the `hr` column.
    pub fn hourly_from_frame(df: &DataFrame) -> Result<HourlyTable, LoaderError> {
        let dates = Self::date_values(df, HOURLY)?;
        let counts = Self::count_values(df, HOURLY)?;

        let hours = if df.column(columns::HOUR).is_ok() {
            let values = Self::unsigned_values(df, HOURLY, columns::HOUR)?;
            let hours = values
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    u8::try_from(value)
                        .ok()
                        .filter(|h| *h < 24)
                        .ok_or(LoaderError::InvalidHour {
                            table: HOURLY,
                            row: i + 1,
                            value,
                        })
                })
                .collect::<Result<Vec<u8>, _>>()?;
            Some(hours)
        } else {
            None
        };

        let categories = if df.column(columns::TIME_CATEGORY).is_ok() {
            Some(Self::string_values(df, HOURLY, columns::TIME_CATEGORY)?)
        } else {
            None
        };

        let mut rows = Vec::with_capacity(dates.len());
        for (i, date) in dates.into_iter().enumerate() {
            let row = i + 1;
            let hour = hours.as_ref().map(|h| h[i]);

            let time_of_day = match (&categories, hour) {
                (Some(labels), _) => labels[i].parse::<TimeOfDay>().map_err(|source| {
                    LoaderError::InvalidCategory {
                        table: HOURLY,
                        row,
                        source,
                    }
                })?,
                (None, Some(hour)) => {
                    TimeOfDay::from_hour(hour).ok_or(LoaderError::InvalidHour {
                        table: HOURLY,
                        row,
                        value: u64::from(hour),
                    })?
                }
                (None, None) => {
                    return Err(LoaderError::MissingColumn {
                        table: HOURLY,
                        column: columns::TIME_CATEGORY,
                    })
                }
            };

            rows.push(HourlyRecord {
                date,
                hour,
                time_of_day,
                registered: counts.registered[i],
                casual: counts.casual[i],
                total: counts.total[i],
            });
        }

        Ok(HourlyTable::new(rows))
    }

    fn require<'a>(
        df: &'a DataFrame,
        table: &'static str,
        column: &'static str,
    ) -> Result<&'a Column, LoaderError> {
        df.column(column)
            .map_err(|_| LoaderError::MissingColumn { table, column })
    }

    fn string_values(
        df: &DataFrame,
        table: &'static str,
        column: &'static str,
    ) -> Result<Vec<String>, LoaderError> {
        let values = Self::require(df, table, column)?.cast(&DataType::String)?;
        let values = values.str()?;

        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.map(str::to_string).ok_or(LoaderError::MissingValue {
                    table,
                    column,
                    row: i + 1,
                })
            })
            .collect()
    }

    fn date_values(df: &DataFrame, table: &'static str) -> Result<Vec<NaiveDate>, LoaderError> {
        Self::string_values(df, table, columns::DATE)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                parse_date(&value).map_err(|_| LoaderError::InvalidDate {
                    table,
                    row: i + 1,
                    value,
                })
            })
            .collect()
    }

    fn unsigned_values(
        df: &DataFrame,
        table: &'static str,
        column: &'static str,
    ) -> Result<Vec<u64>, LoaderError> {
        let values = Self::require(df, table, column)?.cast(&DataType::Int64)?;
        let values = values.i64()?;

        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let row = i + 1;
                let v = v.ok_or(LoaderError::MissingValue { table, column, row })?;
                u64::try_from(v).map_err(|_| LoaderError::NegativeCount {
                    table,
                    column,
                    row,
                    value: v,
                })
            })
            .collect()
    }

    fn count_values(df: &DataFrame, table: &'static str) -> Result<CountColumns, LoaderError> {
        let counts = CountColumns {
            registered: Self::unsigned_values(df, table, columns::REGISTERED)?,
            casual: Self::unsigned_values(df, table, columns::CASUAL)?,
            total: Self::unsigned_values(df, table, columns::TOTAL)?,
        };

        for (i, ((registered, casual), total)) in counts
            .registered
            .iter()
            .zip(&counts.casual)
            .zip(&counts.total)
            .enumerate()
        {
            if registered + casual != *total {
                return Err(LoaderError::CountMismatch {
                    table,
                    row: i + 1,
                    registered: *registered,
                    casual: *casual,
                    total: *total,
                });
            }
        }

        Ok(counts)
    }
}
