//! Text Report Module
//! Plain-text rendering of a dashboard summary for the terminal.

use crate::stats::{format_count, DashboardSummary};
use std::fmt::{self, Write};

/// Render metrics and aggregated tables as aligned text.
pub fn render_text(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    write_text(&mut out, summary)
        .map(|()| out)
        .unwrap_or_default()
}

pub fn write_text<W: Write>(out: &mut W, summary: &DashboardSummary) -> fmt::Result {
    let metrics = &summary.metrics;

    writeln!(out, "BIKE RENTAL DASHBOARD  {}", summary.range)?;
    writeln!(
        out,
        "{} daily rows, {} hourly rows selected",
        summary.daily_rows, summary.hourly_rows
    )?;
    writeln!(out)?;
    writeln!(out, "{:<18}{:>14}", "Total Registered", format_count(metrics.registered))?;
    writeln!(out, "{:<18}{:>14}", "Total Casual", format_count(metrics.casual))?;
    writeln!(out, "{:<18}{:>14}", "Total Users", format_count(metrics.total))?;

    writeln!(out, "\nRentals by season")?;
    for row in &summary.season_totals {
        writeln!(out, "  {:<16}{:>14}", row.key.as_str(), format_count(row.total))?;
    }

    writeln!(out, "\nRentals by time of day")?;
    for row in &summary.time_of_day_totals {
        writeln!(out, "  {:<16}{:>14}", row.key.as_str(), format_count(row.total))?;
    }

    if let Some((registered, casual)) = metrics.user_shares() {
        writeln!(out, "\nUser types")?;
        writeln!(out, "  {:<16}{:>13.1}%", "Registered", registered)?;
        writeln!(out, "  {:<16}{:>13.1}%", "Casual", casual)?;
    }

    writeln!(out, "\n{}", summary.insights.trend)
}
