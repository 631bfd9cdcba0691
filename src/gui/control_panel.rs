//! Control Panel Widget
//! Left side panel with the data source, the date-range selector and export controls.

use crate::data::{DateRange, DATE_FORMAT};
use egui::{Color32, RichText};

/// Left side control panel.
pub struct ControlPanel {
    /// Short description of the loaded data source
    pub source_label: String,
    /// Selectable bounds, `None` when no data is loaded
    bounds: Option<DateRange>,
    /// Selected start/end as day offsets from `bounds.start()`
    start_offset: i64,
    end_offset: i64,
    pub status: String,
    pub status_is_error: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source_label: "No data loaded".to_string(),
            bounds: None,
            start_offset: 0,
            end_offset: 0,
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selectable bounds and reset the selection to the full range.
    pub fn set_bounds(&mut self, bounds: Option<DateRange>) {
        self.bounds = bounds;
        self.reset_range();
    }

    pub fn reset_range(&mut self) {
        self.start_offset = 0;
        self.end_offset = self.bounds.map(|b| b.days() - 1).unwrap_or(0);
    }

    /// Currently selected range, always inside the bounds.
    pub fn selected_range(&self) -> Option<DateRange> {
        let bounds = self.bounds?;
        DateRange::new(
            bounds.date_at(self.start_offset),
            bounds.date_at(self.end_offset),
        )
        .ok()
    }

    /// Move the start; the end follows when it would fall before the start.
    pub fn set_start_offset(&mut self, offset: i64) {
        let max = self.max_offset();
        self.start_offset = offset.clamp(0, max);
        if self.end_offset < self.start_offset {
            self.end_offset = self.start_offset;
        }
    }

    /// Move the end; it never falls before the start.
    pub fn set_end_offset(&mut self, offset: i64) {
        let max = self.max_offset();
        self.end_offset = offset.clamp(self.start_offset, max);
    }

    fn max_offset(&self) -> i64 {
        self.bounds.map(|b| b.days() - 1).unwrap_or(0)
    }

    pub fn set_status(&mut self, status: &str, is_error: bool) {
        self.status = status.to_string();
        self.status_is_error = is_error;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Biker Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 215, 0)),
            );
            ui.label(
                RichText::new("Daily & hourly rentals")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.source_label).size(12.0));
                ui.add_space(4.0);
                if ui.button("📂 Open data folder").clicked() {
                    action = ControlPanelAction::OpenFolder;
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(5.0);

        match self.bounds {
            Some(bounds) => {
                let max = self.max_offset();

                let mut start = self.start_offset;
                ui.label(format!("Start: {}", bounds.date_at(start).format(DATE_FORMAT)));
                if ui
                    .add(egui::Slider::new(&mut start, 0..=max).show_value(false))
                    .changed()
                {
                    self.set_start_offset(start);
                }

                ui.add_space(5.0);

                let mut end = self.end_offset;
                ui.label(format!("End: {}", bounds.date_at(end).format(DATE_FORMAT)));
                if ui
                    .add(egui::Slider::new(&mut end, 0..=max).show_value(false))
                    .changed()
                {
                    self.set_end_offset(end);
                }

                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    if ui.small_button("Full range").clicked() {
                        action = ControlPanelAction::ResetRange;
                    }
                    if let Some(range) = self.selected_range() {
                        ui.label(
                            RichText::new(format!("{} days", range.days()))
                                .size(11.0)
                                .color(Color32::GRAY),
                        );
                    }
                });
            }
            None => {
                ui.label(RichText::new("No dates available").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.bounds.is_some(), |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export charts").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    OpenFolder,
    ResetRange,
    ExportCharts,
}
