//! Data module - CSV loading, typed tables and date filtering

mod loader;
mod processor;
mod record;

pub use loader::{
    columns, DataLoader, DataSources, Datasets, LoaderError, DEFAULT_DAILY_FILE,
    DEFAULT_HOURLY_FILE,
};
pub use processor::{parse_date, DataProcessor, DateRange, RangeError, DATE_FORMAT};
pub use record::{
    date_to_key, key_to_date, CategoryError, DailyRecord, DailyTable, HourlyRecord, HourlyTable,
    Record, Season, Table, TimeOfDay, CASUAL_COL, DATE_COL, REGISTERED_COL, SEASON_COL,
    TIME_OF_DAY_COL, TOTAL_COL,
};
