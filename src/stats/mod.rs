//! Stats module - aggregation and dashboard summaries

mod aggregator;
mod summary;

pub use aggregator::{
    AggregateError, Aggregator, CategoryTotal, DateBreakdown, DatedValue, Metrics, SeasonTotal,
    TimeOfDayTotal,
};
pub use summary::{format_count, DashboardSummary, Insights};
