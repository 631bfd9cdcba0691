//! Dashboard Summary Module
//! One immutable snapshot per selected date range: metrics, aggregations and insights.

use super::aggregator::{
    AggregateError, Aggregator, CategoryTotal, DatedValue, Metrics, SeasonTotal, TimeOfDayTotal,
};
use crate::data::{DataProcessor, Datasets, DateRange};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

/// Explanatory text for each chart, computed from the filtered data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub season: String,
    pub user_types: String,
    pub time_of_day: String,
    pub trend: String,
}

/// Everything the presentation layer needs for one date range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub range: DateRange,
    pub daily_rows: usize,
    pub hourly_rows: usize,
    pub metrics: Metrics,
    pub season_totals: Vec<SeasonTotal>,
    pub time_of_day_totals: Vec<TimeOfDayTotal>,
    pub registered_by_date: Vec<DatedValue>,
    pub casual_by_date: Vec<DatedValue>,
    pub total_by_date: Vec<DatedValue>,
    pub insights: Insights,
}

impl DashboardSummary {
    /// Filter both tables to `range` and run every aggregation.
    pub fn compute(datasets: &Datasets, range: DateRange) -> Result<Self, AggregateError> {
        let daily = DataProcessor::filter_by_date(&datasets.daily, &range);
        let hourly = DataProcessor::filter_by_date(&datasets.hourly, &range);

        let season_totals = Aggregator::season_totals(&daily)?;
        let time_of_day_totals = Aggregator::time_of_day_totals(&hourly)?;
        let registered_by_date = Aggregator::registered_by_date(&daily)?;
        let casual_by_date = Aggregator::casual_by_date(&daily)?;
        let total_by_date = Aggregator::total_by_date(&daily)?;

        let metrics = Metrics::from_series(&registered_by_date, &casual_by_date, &total_by_date);

        let insights = Insights {
            season: category_insight("season", &season_totals),
            user_types: user_type_insight(&metrics),
            time_of_day: category_insight("time of day", &time_of_day_totals),
            trend: trend_insight(&total_by_date),
        };

        debug!(
            %range,
            daily_rows = daily.len(),
            hourly_rows = hourly.len(),
            total = metrics.total,
            "computed dashboard summary"
        );

        Ok(Self {
            range,
            daily_rows: daily.len(),
            hourly_rows: hourly.len(),
            metrics,
            season_totals,
            time_of_day_totals,
            registered_by_date,
            casual_by_date,
            total_by_date,
            insights,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.daily_rows == 0 && self.hourly_rows == 0
    }
}

/// Format a count with thousands separators, e.g. `1,061,129`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Categories ranked by total, largest first.
fn ranked<K: Copy + Ord>(totals: &[CategoryTotal<K>]) -> Vec<CategoryTotal<K>> {
    let mut ranked = totals.to_vec();
    ranked.sort_by(|a, b| b.total.cmp(&a.total).then(a.key.cmp(&b.key)));
    ranked
}

fn category_insight<K: Copy + Ord + Display>(label: &str, totals: &[CategoryTotal<K>]) -> String {
    let ranked = ranked(totals);
    let Some(top) = ranked.first() else {
        return "No rentals in the selected range.".to_string();
    };

    let mut text = format!(
        "The {} with the most rentals is {} with {} rentals.\n\nRentals by {}:",
        label,
        top.key,
        format_count(top.total),
        label
    );
    for row in &ranked {
        text.push_str(&format!("\n- {}: {} rentals", row.key, format_count(row.total)));
    }
    text
}

fn user_type_insight(metrics: &Metrics) -> String {
    match metrics.user_shares() {
        Some((registered, casual)) => format!(
            "Registered users account for {:.1}% of rentals ({}), casual users for {:.1}% ({}).",
            registered,
            format_count(metrics.registered),
            casual,
            format_count(metrics.casual)
        ),
        None => "No rentals in the selected range.".to_string(),
    }
}

fn trend_insight(series: &[DatedValue]) -> String {
    let Some(busiest) = series
        .iter()
        .max_by(|a, b| a.value.cmp(&b.value).then(b.date.cmp(&a.date)))
    else {
        return "No rentals in the selected range.".to_string();
    };

    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for point in series {
        *months
            .entry((point.date.year(), point.date.month()))
            .or_default() += point.value;
    }
    let (peak_month, peak_total) = months
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(month, total)| (*month, *total))
        .unwrap_or(((busiest.date.year(), busiest.date.month()), busiest.value));

    format!(
        "Rentals peaked in {}-{:02} with {} rentals. The busiest single day was {} with {} rentals.",
        peak_month.0,
        peak_month.1,
        format_count(peak_total),
        busiest.date,
        format_count(busiest.value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        DailyRecord, DailyTable, HourlyRecord, HourlyTable, Season, TimeOfDay,
    };
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datasets() -> Datasets {
        let daily = DailyTable::new(vec![
            DailyRecord {
                date: day(2011, 1, 1),
                season: Season::Spring,
                registered: 10,
                casual: 5,
                total: 15,
            },
            DailyRecord {
                date: day(2011, 1, 2),
                season: Season::Spring,
                registered: 20,
                casual: 8,
                total: 28,
            },
        ]);
        let hourly = HourlyTable::new(vec![
            HourlyRecord {
                date: day(2011, 1, 1),
                hour: Some(9),
                time_of_day: TimeOfDay::Morning,
                registered: 10,
                casual: 5,
                total: 15,
            },
            HourlyRecord {
                date: day(2011, 1, 2),
                hour: Some(19),
                time_of_day: TimeOfDay::Evening,
                registered: 20,
                casual: 8,
                total: 28,
            },
        ]);
        Datasets { daily, hourly }
    }

    #[test]
    fn single_day_selection_matches_the_raw_record() {
        let summary = DashboardSummary::compute(&datasets(), DateRange::single(day(2011, 1, 1))).unwrap();

        assert_eq!(
            summary.metrics,
            Metrics {
                registered: 10,
                casual: 5,
                total: 15
            }
        );
        assert_eq!(
            summary.season_totals,
            vec![SeasonTotal { key: Season::Spring, total: 15 }]
        );
        assert_eq!(summary.total_by_date.len(), 1);
        assert_eq!(summary.total_by_date[0].value, 15);
        assert_eq!(
            summary.time_of_day_totals,
            vec![TimeOfDayTotal { key: TimeOfDay::Morning, total: 15 }]
        );
    }

    #[test]
    fn hourly_aggregation_uses_the_filtered_hourly_table() {
        let summary = DashboardSummary::compute(&datasets(), DateRange::single(day(2011, 1, 2))).unwrap();
        assert_eq!(summary.hourly_rows, 1);
        assert_eq!(summary.time_of_day_totals[0].key, TimeOfDay::Evening);
    }

    #[test]
    fn range_outside_data_is_empty_not_an_error() {
        let range = DateRange::new(day(2015, 1, 1), day(2015, 2, 1)).unwrap();
        let summary = DashboardSummary::compute(&datasets(), range).unwrap();

        assert!(summary.is_empty());
        assert_eq!(summary.metrics, Metrics::default());
        assert!(summary.season_totals.is_empty());
        assert!(summary.registered_by_date.is_empty());
        assert_eq!(summary.insights.season, "No rentals in the selected range.");
    }

    #[test]
    fn insights_follow_the_filter() {
        let full = DateRange::new(day(2011, 1, 1), day(2011, 1, 2)).unwrap();
        let summary = DashboardSummary::compute(&datasets(), full).unwrap();

        assert!(summary.insights.season.contains("Spring with 43 rentals"));
        assert!(summary.insights.user_types.contains("69.8%"));
        assert!(summary.insights.time_of_day.starts_with(
            "The time of day with the most rentals is Evening"
        ));
        assert!(summary.insights.trend.contains("2011-01 with 43 rentals"));
        assert!(summary.insights.trend.contains("2011-01-02 with 28 rentals"));
    }

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1061129), "1,061,129");
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = DashboardSummary::compute(&datasets(), DateRange::single(day(2011, 1, 1))).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["metrics"]["total"], 15);
        assert_eq!(json["season_totals"][0]["key"], "spring");
        assert_eq!(json["range"]["start"], "2011-01-01");
    }
}
