//! Charts module - interactive and static chart rendering

mod plotter;
mod renderer;

use crate::stats::CategoryTotal;

pub use plotter::{ChartPlotter, HIGHLIGHT_COLOR, MUTED_COLOR, TREND_COLOR};
pub use renderer::{ChartKind, RenderError, StaticChartRenderer};

/// Index of the bar to highlight: the largest non-zero total, first wins on ties.
pub fn highlight_index<K>(rows: &[CategoryTotal<K>]) -> Option<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.total > 0)
        .max_by(|a, b| a.1.total.cmp(&b.1.total).then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
}
