//! Bike Dashboard - bike-sharing rentals explorer
//!
//! Loads the daily and hourly rental tables, filters them by date range and
//! aggregates them into the summaries shown by the GUI, the text report and
//! the PNG export.

pub mod charts;
pub mod data;
pub mod gui;
pub mod report;
pub mod stats;
