//! Chart Plotter Module
//! Creates interactive dashboard charts using egui_plot and the egui painter.

use super::highlight_index;
use crate::data::{date_to_key, key_to_date};
use crate::stats::{format_count, CategoryTotal, DatedValue, Metrics};
use egui::{vec2, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt::Display;

/// Highlight for the largest bar and the registered slice
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(255, 215, 0); // Gold
pub const MUTED_COLOR: Color32 = Color32::from_rgb(211, 211, 211); // Light grey
pub const TREND_COLOR: Color32 = Color32::from_rgb(184, 184, 20); // Olive

const PIE_SEGMENTS: usize = 24;

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Bar chart with one bar per category, x-axis labelled with category names.
    pub fn draw_category_bars<K: Display>(
        ui: &mut egui::Ui,
        id: &str,
        x_label: &str,
        rows: &[CategoryTotal<K>],
        height: f32,
    ) {
        let labels: Vec<String> = rows.iter().map(|r| r.key.to_string()).collect();
        let highlight = highlight_index(rows);
        let n = rows.len();

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let color = if Some(i) == highlight {
                    HIGHLIGHT_COLOR
                } else {
                    MUTED_COLOR
                };
                Bar::new(i as f64, row.total as f64)
                    .name(format!("{}: {}", labels[i], format_count(row.total)))
                    .width(0.6)
                    .fill(color)
                    .stroke(Stroke::new(1.0, color.gamma_multiply(0.8)))
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_x(false)
            .include_y(0.0)
            .include_x(-0.5)
            .include_x(n as f64 - 0.5)
            .x_axis_label(x_label)
            .y_axis_label("Rentals")
            .x_grid_spacer(move |_input| {
                (0..n)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(|mark, _range| format_count(mark.value.max(0.0) as u64))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Pie chart of registered vs casual users.
    pub fn draw_user_pie(ui: &mut egui::Ui, metrics: &Metrics, size: f32) {
        let (rect, _) = ui.allocate_exact_size(vec2(ui.available_width(), size), Sense::hover());
        let painter = ui.painter_at(rect);

        let Some((registered_pct, casual_pct)) = metrics.user_shares() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No data",
                FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        let center = rect.center();
        let radius = size * 0.42;
        let slices = [
            ("Registered", registered_pct, HIGHLIGHT_COLOR),
            ("Casual", casual_pct, MUTED_COLOR),
        ];

        // Start at 12 o'clock
        let mut start = -FRAC_PI_2;
        for (label, pct, color) in slices {
            if pct <= 0.0 {
                continue;
            }
            let sweep = pct as f32 / 100.0 * TAU;
            for shape in Self::wedge_shapes(center, radius, start, sweep, color) {
                painter.add(shape);
            }

            let mid = start + sweep / 2.0;
            let label_pos = center + vec2(mid.cos(), mid.sin()) * radius * 0.6;
            painter.text(
                label_pos,
                Align2::CENTER_CENTER,
                format!("{}\n{:.1}%", label, pct),
                FontId::proportional(14.0),
                Color32::BLACK,
            );
            start += sweep;
        }
    }

    /// A pie wedge as convex polygons spanning at most a quarter turn each.
    fn wedge_shapes(center: Pos2, radius: f32, start: f32, sweep: f32, color: Color32) -> Vec<Shape> {
        let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / pieces as f32;

        (0..pieces)
            .map(|p| {
                let from = start + step * p as f32;
                let mut points = Vec::with_capacity(PIE_SEGMENTS + 2);
                points.push(center);
                for s in 0..=PIE_SEGMENTS {
                    let angle = from + step * s as f32 / PIE_SEGMENTS as f32;
                    points.push(center + vec2(angle.cos(), angle.sin()) * radius);
                }
                Shape::convex_polygon(points, color, Stroke::new(1.0, Color32::WHITE))
            })
            .collect()
    }

    /// Daily rentals over time. X values are day numbers, labelled as `YYYY-MM`.
    pub fn draw_trend_line(ui: &mut egui::Ui, series: &[DatedValue], height: f32) {
        if series.is_empty() {
            ui.allocate_ui(vec2(ui.available_width(), height), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("No data");
                });
            });
            return;
        }

        let points: PlotPoints = series
            .iter()
            .map(|p| [date_to_key(p.date) as f64, p.value as f64])
            .collect();

        Plot::new("trend_line")
            .height(height)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Date")
            .y_axis_label("Rentals")
            .x_axis_formatter(|mark, _range| {
                key_to_date(mark.value.round() as i32)
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_default()
            })
            .y_axis_formatter(|mark, _range| format_count(mark.value.max(0.0) as u64))
            .label_formatter(|_name, value| {
                let date = key_to_date(value.x.round() as i32)
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                format!("{}\n{} rentals", date, format_count(value.y.max(0.0) as u64))
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(TREND_COLOR)
                        .width(2.0)
                        .name("Daily rentals"),
                );
            });
    }
}
