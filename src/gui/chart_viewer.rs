//! Chart Viewer Widget
//! Central scrollable panel with the metric cards and the four chart panels.

use crate::charts::ChartPlotter;
use crate::data::{Season, TimeOfDay};
use crate::stats::{format_count, Aggregator, DashboardSummary};
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 280.0;
const TREND_HEIGHT: f32 = 320.0;
const PANEL_SPACING: f32 = 15.0;

/// Displays the dashboard for the current summary.
#[derive(Default)]
pub struct ChartViewer {
    pub summary: Option<DashboardSummary>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.summary = None;
    }

    pub fn set_summary(&mut self, summary: DashboardSummary) {
        self.summary = Some(summary);
    }

    /// Draw the dashboard
    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(summary) = &self.summary else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("BIKER DASHBOARD 🚲").size(26.0).strong());
                ui.label(
                    RichText::new(summary.range.to_string())
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(PANEL_SPACING);

                Self::draw_metrics(ui, summary);
                ui.add_space(PANEL_SPACING);

                ui.columns(2, |cols| {
                    Self::chart_panel(
                        &mut cols[0],
                        "Season Rental bike",
                        &summary.insights.season,
                        |ui| {
                            let rows =
                                Aggregator::fill_categories(&Season::ALL, &summary.season_totals);
                            ChartPlotter::draw_category_bars(
                                ui,
                                "season_bars",
                                "Season",
                                &rows,
                                CHART_HEIGHT,
                            );
                        },
                    );
                    Self::chart_panel(
                        &mut cols[1],
                        "Comparison of registered and casual users",
                        &summary.insights.user_types,
                        |ui| ChartPlotter::draw_user_pie(ui, &summary.metrics, CHART_HEIGHT),
                    );
                });

                ui.add_space(PANEL_SPACING);

                ui.columns(2, |cols| {
                    Self::chart_panel(
                        &mut cols[0],
                        "Hour Rental bike",
                        &summary.insights.time_of_day,
                        |ui| {
                            let rows = Aggregator::fill_categories(
                                &TimeOfDay::ALL,
                                &summary.time_of_day_totals,
                            );
                            ChartPlotter::draw_category_bars(
                                ui,
                                "time_of_day_bars",
                                "Time of day",
                                &rows,
                                CHART_HEIGHT,
                            );
                        },
                    );
                    Self::draw_selection_table(&mut cols[1], summary);
                });

                ui.add_space(PANEL_SPACING);

                Self::chart_panel(
                    ui,
                    "Bike Rental Trends over Time",
                    &summary.insights.trend,
                    |ui| ChartPlotter::draw_trend_line(ui, &summary.total_by_date, TREND_HEIGHT),
                );
            });
    }

    fn draw_metrics(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let metrics = &summary.metrics;
        ui.columns(3, |cols| {
            Self::metric_card(&mut cols[0], "Total Registered", metrics.registered);
            Self::metric_card(&mut cols[1], "Total Casual", metrics.casual);
            Self::metric_card(&mut cols[2], "Total Users", metrics.total);
        });
    }

    fn metric_card(ui: &mut egui::Ui, label: &str, value: u64) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(RichText::new(format_count(value)).size(28.0).strong());
            });
    }

    /// Titled card with a chart and a collapsible explanation.
    fn chart_panel(
        ui: &mut egui::Ui,
        title: &str,
        explanation: &str,
        draw: impl FnOnce(&mut egui::Ui),
    ) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(8.0);
                draw(ui);
                ui.add_space(6.0);
                egui::CollapsingHeader::new("See explanation")
                    .id_salt(title)
                    .show(ui, |ui| {
                        ui.label(explanation);
                    });
            });
    }

    /// Rows per table and per-category totals next to the time-of-day chart.
    fn draw_selection_table(ui: &mut egui::Ui, summary: &DashboardSummary) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Selection").size(16.0).strong());
                ui.add_space(8.0);

                egui::Grid::new("selection_table")
                    .striped(true)
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Days in range");
                        ui.label(summary.range.days().to_string());
                        ui.end_row();
                        ui.label("Daily rows");
                        ui.label(format_count(summary.daily_rows as u64));
                        ui.end_row();
                        ui.label("Hourly rows");
                        ui.label(format_count(summary.hourly_rows as u64));
                        ui.end_row();

                        for row in &summary.season_totals {
                            ui.label(row.key.as_str());
                            ui.label(format_count(row.total));
                            ui.end_row();
                        }
                        for row in &summary.time_of_day_totals {
                            ui.label(row.key.as_str());
                            ui.label(format_count(row.total));
                            ui.end_row();
                        }
                    });
            });
    }
}
