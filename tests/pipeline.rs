use bike_dashboard::charts::{ChartKind, RenderError, StaticChartRenderer};
use bike_dashboard::data::{
    DataLoader, DataProcessor, DataSources, Datasets, DateRange, LoaderError, Season, TimeOfDay,
};
use bike_dashboard::report;
use bike_dashboard::stats::{Aggregator, CategoryTotal, DashboardSummary, Metrics};
use chrono::NaiveDate;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load() -> Datasets {
    let sources = DataSources::default().with_data_dir(fixtures());
    DataLoader::new(sources).load().expect("fixtures load")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

#[test]
fn fixtures_load_with_expected_bounds() {
    let datasets = load();
    assert_eq!(datasets.daily.len(), 6);
    assert_eq!(datasets.hourly.len(), 10);
    assert_eq!(
        datasets.date_bounds(),
        Some(range(day(2011, 1, 1), day(2011, 12, 31)))
    );
    assert!(datasets.hourly.rows().iter().all(|r| r.hour.is_some()));
}

#[test]
fn filtered_count_matches_dates_in_range() {
    let datasets = load();
    let selected = range(day(2011, 1, 2), day(2011, 7, 15));

    let daily = DataProcessor::filter_by_date(&datasets.daily, &selected);
    let expected = datasets
        .daily
        .rows()
        .iter()
        .filter(|r| r.date >= selected.start() && r.date <= selected.end())
        .count();
    assert_eq!(daily.len(), expected);
    assert_eq!(daily.len(), 3);

    let hourly = DataProcessor::filter_by_date(&datasets.hourly, &selected);
    assert_eq!(hourly.len(), 7);
}

#[test]
fn full_range_totals_are_conserved() {
    let datasets = load();
    let full = datasets.date_bounds().unwrap();
    let summary = DashboardSummary::compute(&datasets, full).unwrap();

    let season_sum: u64 = summary.season_totals.iter().map(|r| r.total).sum();
    assert_eq!(season_sum, datasets.daily.total_count());
    assert_eq!(season_sum, 713);

    let time_sum: u64 = summary.time_of_day_totals.iter().map(|r| r.total).sum();
    assert_eq!(time_sum, datasets.hourly.total_count());
    assert_eq!(time_sum, 473);

    assert_eq!(
        summary.season_totals,
        vec![
            CategoryTotal { key: Season::Spring, total: 43 },
            CategoryTotal { key: Season::Summer, total: 140 },
            CategoryTotal { key: Season::Fall, total: 290 },
            CategoryTotal { key: Season::Winter, total: 240 },
        ]
    );
    assert_eq!(
        summary.time_of_day_totals,
        vec![
            CategoryTotal { key: TimeOfDay::Morning, total: 219 },
            CategoryTotal { key: TimeOfDay::Afternoon, total: 55 },
            CategoryTotal { key: TimeOfDay::Evening, total: 55 },
            CategoryTotal { key: TimeOfDay::Night, total: 144 },
        ]
    );
    assert_eq!(
        summary.metrics,
        Metrics { registered: 530, casual: 183, total: 713 }
    );
}

#[test]
fn date_rows_are_additive() {
    let datasets = load();
    let ranges = [
        datasets.date_bounds().unwrap(),
        range(day(2011, 1, 2), day(2011, 4, 1)),
        range(day(2013, 1, 1), day(2013, 2, 1)),
    ];

    for selected in ranges {
        let daily = DataProcessor::filter_by_date(&datasets.daily, &selected);
        let hourly = DataProcessor::filter_by_date(&datasets.hourly, &selected);
        let daily_rows = Aggregator::date_breakdown(&daily).unwrap();
        let hourly_rows = Aggregator::date_breakdown(&hourly).unwrap();

        assert_eq!(daily_rows.len(), daily.len(), "{}", selected);
        for row in daily_rows.iter().chain(&hourly_rows) {
            assert!(selected.contains(row.date));
            assert_eq!(row.registered + row.casual, row.total, "{}", row.date);
        }
    }
}

#[test]
fn hourly_rows_sum_to_the_daily_row() {
    let datasets = load();
    let hourly = Aggregator::total_by_date(&datasets.hourly).unwrap();
    let daily = Aggregator::total_by_date(&datasets.daily).unwrap();
    for value in hourly {
        let matching = daily.iter().find(|d| d.date == value.date).unwrap();
        assert_eq!(matching.value, value.value);
    }
}

#[test]
fn single_day_yields_that_record() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, DateRange::single(day(2011, 4, 1))).unwrap();

    assert_eq!(summary.daily_rows, 1);
    assert_eq!(summary.total_by_date.len(), 1);
    assert_eq!(summary.total_by_date[0].date, day(2011, 4, 1));
    assert_eq!(summary.total_by_date[0].value, 140);
    assert_eq!(summary.registered_by_date[0].value, 100);
    assert_eq!(summary.casual_by_date[0].value, 40);
    assert_eq!(
        summary.season_totals,
        vec![CategoryTotal { key: Season::Summer, total: 140 }]
    );
    // Only the categories observed that day
    assert_eq!(summary.time_of_day_totals.len(), 3);
}

#[test]
fn range_outside_the_data_is_empty() {
    let datasets = load();
    let summary =
        DashboardSummary::compute(&datasets, range(day(2013, 1, 1), day(2013, 2, 1))).unwrap();

    assert!(summary.is_empty());
    assert_eq!(summary.metrics, Metrics::default());
    assert!(summary.season_totals.is_empty());
    assert!(summary.time_of_day_totals.is_empty());
    assert!(summary.total_by_date.is_empty());
    assert_eq!(summary.insights.season, "No rentals in the selected range.");

    let text = report::render_text(&summary);
    assert!(text.contains("Total Users"));
}

#[test]
fn worked_example_first_day() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, DateRange::single(day(2011, 1, 1))).unwrap();

    assert_eq!(
        summary.metrics,
        Metrics { registered: 10, casual: 5, total: 15 }
    );
    assert_eq!(
        summary.season_totals,
        vec![CategoryTotal { key: Season::Spring, total: 15 }]
    );
}

#[test]
fn insights_follow_the_selection() {
    let datasets = load();
    let winter = DashboardSummary::compute(&datasets, range(day(2011, 10, 1), day(2011, 12, 31)))
        .unwrap();
    assert!(winter.insights.season.contains("Winter"));
    assert!(!winter.insights.season.contains("Fall"));

    let all = DashboardSummary::compute(&datasets, datasets.date_bounds().unwrap()).unwrap();
    assert!(all.insights.season.contains("is Fall"));
}

#[test]
fn summary_serializes_to_json() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, datasets.date_bounds().unwrap()).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["metrics"]["total"], 713);
    assert_eq!(json["season_totals"][0]["key"], "spring");
    assert_eq!(json["total_by_date"].as_array().unwrap().len(), 6);
}

#[test]
fn missing_data_dir_is_a_load_error() {
    let sources = DataSources::default().with_data_dir(fixtures().join("does-not-exist"));
    let err = DataLoader::new(sources).load().unwrap_err();
    assert!(matches!(err, LoaderError::FileNotFound(_)));
}

#[test]
fn export_into_a_file_path_fails() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, datasets.date_bounds().unwrap()).unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    let err = StaticChartRenderer::export_all(&summary, file.path(), (800, 600)).unwrap_err();
    assert!(matches!(err, RenderError::OutputDir { .. }));
}

fn assert_exported(summary: &DashboardSummary) {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = StaticChartRenderer::export_all(summary, dir.path(), (800, 600)).unwrap();
    assert_eq!(paths.len(), ChartKind::ALL.len());

    for kind in ChartKind::ALL {
        let path = dir.path().join(kind.file_name());
        assert!(paths.contains(&path), "{}", path.display());
        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len > 0, "{} is empty", path.display());
    }
}

#[test]
fn exports_all_charts_for_the_full_range() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, datasets.date_bounds().unwrap()).unwrap();
    assert_exported(&summary);
}

#[test]
fn exports_all_charts_for_a_single_day() {
    let datasets = load();
    let summary = DashboardSummary::compute(&datasets, DateRange::single(day(2011, 4, 1))).unwrap();
    assert_eq!(summary.total_by_date.len(), 1);
    assert_exported(&summary);
}

#[test]
fn exports_placeholders_for_an_empty_selection() {
    let datasets = load();
    let summary =
        DashboardSummary::compute(&datasets, range(day(2013, 1, 1), day(2013, 2, 1))).unwrap();
    assert!(summary.is_empty());
    assert_exported(&summary);
}
