//! Bike Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{DataLoader, DataSources, Datasets, DateRange};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::DashboardSummary;
use egui::SidePanel;
use tracing::{debug, info, warn};

/// Size of exported PNG charts
pub const EXPORT_SIZE: (u32, u32) = (1400, 800);

/// Main application window.
pub struct DashboardApp {
    sources: DataSources,
    datasets: Datasets,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    /// Range of the summary currently shown
    applied_range: Option<DateRange>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, sources: DataSources, datasets: Datasets) -> Self {
        let mut app = Self {
            sources: DataSources::default(),
            datasets: Datasets::default(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            applied_range: None,
        };
        app.set_datasets(sources, datasets);
        app
    }

    fn set_datasets(&mut self, sources: DataSources, datasets: Datasets) {
        self.control_panel.source_label = format!(
            "{}\n{} ({} days), {} ({} rows)",
            sources.data_dir.display(),
            sources.daily_file,
            datasets.daily.len(),
            sources.hourly_file,
            datasets.hourly.len()
        );
        self.control_panel.set_bounds(datasets.date_bounds());
        self.sources = sources;
        self.datasets = datasets;
        self.applied_range = None;
        self.chart_viewer.clear();
        self.refresh();
    }

    /// Recompute the summary when the selected range changed.
    fn refresh(&mut self) {
        let range = self.control_panel.selected_range();
        if range == self.applied_range {
            return;
        }
        let Some(range) = range else {
            self.chart_viewer.clear();
            self.applied_range = None;
            return;
        };

        debug!(%range, "date range changed");
        match DashboardSummary::compute(&self.datasets, range) {
            Ok(summary) => {
                self.control_panel.set_status(
                    &format!(
                        "{} daily rows, {} hourly rows selected",
                        summary.daily_rows, summary.hourly_rows
                    ),
                    false,
                );
                self.chart_viewer.set_summary(summary);
                self.applied_range = Some(range);
            }
            Err(e) => {
                warn!(error = %e, "aggregation failed");
                self.control_panel.set_status(&format!("Error: {}", e), true);
                self.chart_viewer.clear();
                self.applied_range = Some(range);
            }
        }
    }

    /// Handle data folder selection
    fn handle_open_folder(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.sources.data_dir)
            .pick_folder()
        else {
            return;
        };

        let sources = self.sources.with_data_dir(dir);
        match DataLoader::new(sources.clone()).load() {
            Ok(datasets) => {
                info!(dir = %sources.data_dir.display(), "switched data folder");
                self.set_datasets(sources, datasets);
            }
            Err(e) => {
                warn!(error = %e, "failed to load data folder");
                self.control_panel.set_status(&format!("Error: {}", e), true);
            }
        }
    }

    /// Handle PNG export of the current charts
    fn handle_export_charts(&mut self) {
        let Some(summary) = &self.chart_viewer.summary else {
            self.control_panel.set_status("No charts to export", true);
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_all(summary, &dir, EXPORT_SIZE) {
            Ok(paths) => {
                self.control_panel.set_status(
                    &format!("Exported {} charts to {}", paths.len(), dir.display()),
                    false,
                );
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                warn!(error = %e, "chart export failed");
                self.control_panel.set_status(&format!("Error: {}", e), true);
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::OpenFolder => self.handle_open_folder(),
                        ControlPanelAction::ResetRange => self.control_panel.reset_range(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        self.refresh();

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
