//! Static Chart Renderer
//! Renders the four dashboard charts to PNG files with plotters.
//!
//! Files written per export:
//! 1. `season_rentals.png`: bar chart of rentals by season
//! 2. `user_types.png`: pie chart of registered vs casual users
//! 3. `time_of_day_rentals.png`: bar chart of rentals by time of day
//! 4. `rental_trend.png`: daily rentals over the selected range

use super::highlight_index;
use crate::data::{Season, TimeOfDay};
use crate::stats::{format_count, Aggregator, CategoryTotal, DashboardSummary, DatedValue};
use chrono::Duration;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rayon::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const GOLD: RGBColor = RGBColor(255, 215, 0);
const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);
const OLIVE: RGBColor = RGBColor(184, 184, 20);

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// The four dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Season,
    UserTypes,
    TimeOfDay,
    Trend,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Season,
        ChartKind::UserTypes,
        ChartKind::TimeOfDay,
        ChartKind::Trend,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Season => "Season Rental Bike",
            ChartKind::UserTypes => "Registered vs Casual Users",
            ChartKind::TimeOfDay => "Hour Rental Bike",
            ChartKind::Trend => "Bike Rental Trends over Time",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Season => "season_rentals.png",
            ChartKind::UserTypes => "user_types.png",
            ChartKind::TimeOfDay => "time_of_day_rentals.png",
            ChartKind::Trend => "rental_trend.png",
        }
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart into `out_dir`, one file per chart, in parallel.
    pub fn export_all(
        summary: &DashboardSummary,
        out_dir: &Path,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(out_dir).map_err(|source| RenderError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let paths = ChartKind::ALL
            .par_iter()
            .map(|kind| -> Result<PathBuf, RenderError> {
                let path = out_dir.join(kind.file_name());
                Self::render_png(summary, *kind, &path, size)?;
                Ok(path)
            })
            .collect::<Result<Vec<PathBuf>, RenderError>>()?;

        info!(dir = %out_dir.display(), charts = paths.len(), "exported charts");
        Ok(paths)
    }

    /// Render one chart to a PNG file.
    pub fn render_png(
        summary: &DashboardSummary,
        kind: ChartKind,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        match kind {
            ChartKind::Season => {
                let rows = Aggregator::fill_categories(&Season::ALL, &summary.season_totals);
                Self::draw_category_bars(&root, kind.title(), "Season", &rows)?;
            }
            ChartKind::TimeOfDay => {
                let rows =
                    Aggregator::fill_categories(&TimeOfDay::ALL, &summary.time_of_day_totals);
                Self::draw_category_bars(&root, kind.title(), "Time of day", &rows)?;
            }
            ChartKind::UserTypes => {
                Self::draw_user_pie(
                    &root,
                    kind.title(),
                    summary.metrics.registered,
                    summary.metrics.casual,
                )?;
            }
            ChartKind::Trend => {
                Self::draw_trend(&root, kind.title(), &summary.total_by_date)?;
            }
        }

        root.present().map_err(draw_err)?;
        debug!(chart = ?kind, path = %path.display(), "rendered chart");
        Ok(())
    }

    fn draw_category_bars<DB: DrawingBackend, K: Display>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        x_desc: &str,
        rows: &[CategoryTotal<K>],
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = rows.iter().map(|r| r.key.to_string()).collect();
        let max = rows.iter().map(|r| r.total).max().unwrap_or(0).max(1);
        let highlight = highlight_index(rows);

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((0..rows.len()).into_segmented(), 0u64..max + max / 10)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc("Rentals")
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| format_count(*v))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let color = if Some(i) == highlight { GOLD } else { LIGHT_GREY };
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0),
                        (SegmentValue::Exact(i + 1), row.total),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 20, 20);
                bar
            }))
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_user_pie<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        registered: u64,
        casual: u64,
    ) -> Result<(), RenderError> {
        let area = root.titled(title, (FONT, 28)).map_err(draw_err)?;

        if registered + casual == 0 {
            return Self::draw_placeholder(&area);
        }

        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.38;
        let sizes = [registered as f64, casual as f64];
        let colors = [GOLD, LIGHT_GREY];
        let labels = ["Registered", "Casual"];

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style((FONT, 22).into_font().color(&BLACK));
        pie.percentages((FONT, 20).into_font().color(&BLACK));
        area.draw(&pie).map_err(draw_err)?;
        Ok(())
    }

    fn draw_trend<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        series: &[DatedValue],
    ) -> Result<(), RenderError> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            let area = root.titled(title, (FONT, 28)).map_err(draw_err)?;
            return Self::draw_placeholder(&area);
        };

        let start = first.date;
        let end = if last.date > start {
            last.date
        } else {
            start + Duration::days(1)
        };
        let max = series.iter().map(|p| p.value).max().unwrap_or(0).max(1);

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(start..end, 0u64..max + max / 10)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_desc("Date")
            .y_desc("Rentals")
            .x_label_formatter(&|d| d.format("%Y-%m").to_string())
            .y_label_formatter(&|v| format_count(*v))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|p| (p.date, p.value)),
                OLIVE.stroke_width(2),
            ))
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_placeholder<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        let (width, height) = area.dim_in_pixel();
        let style = TextStyle::from((FONT, 24).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            "No data in the selected range",
            (width as i32 / 2, height as i32 / 2),
            style,
        ))
        .map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_files_are_distinct_pngs() {
        let names: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        for (i, name) in names.iter().enumerate() {
            assert!(name.ends_with(".png"));
            assert!(!names[i + 1..].contains(name));
        }
    }
}
