//! Bike Dashboard - interactive bike-sharing dashboard, text report and PNG export.

use anyhow::{anyhow, bail, Context, Result};
use bike_dashboard::charts::StaticChartRenderer;
use bike_dashboard::data::{
    parse_date, DataLoader, DataSources, Datasets, DateRange, DEFAULT_DAILY_FILE,
    DEFAULT_HOURLY_FILE,
};
use bike_dashboard::gui::{DashboardApp, EXPORT_SIZE};
use bike_dashboard::report;
use bike_dashboard::stats::DashboardSummary;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use eframe::egui;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "bike-dashboard")]
#[command(about = "Explore daily and hourly bike-sharing rentals", long_about = None)]
struct Cli {
    /// Directory holding the daily and hourly CSV files
    #[arg(long, global = true, env = "BIKE_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Daily table file name, relative to the data directory
    #[arg(long, global = true, env = "BIKE_DAILY_FILE", default_value = DEFAULT_DAILY_FILE)]
    daily_file: String,

    /// Hourly table file name, relative to the data directory
    #[arg(long, global = true, env = "BIKE_HOURLY_FILE", default_value = DEFAULT_HOURLY_FILE)]
    hourly_file: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Gui,
    /// Print the summary for a date range
    Report {
        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render the four charts as PNG files
    Export {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long, default_value_t = EXPORT_SIZE.0)]
        width: u32,

        #[arg(long, default_value_t = EXPORT_SIZE.1)]
        height: u32,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// First day, YYYY-MM-DD (defaults to the earliest day in the data)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last day, YYYY-MM-DD (defaults to the latest day in the data)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

impl RangeArgs {
    /// Fill missing bounds from the data. The range is not clamped to it.
    fn resolve(&self, datasets: &Datasets) -> Result<DateRange> {
        let bounds = datasets.date_bounds();
        let start = self.start.or(bounds.map(|b| b.start()));
        let end = self.end.or(bounds.map(|b| b.end()));
        match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange::new(start, end)?),
            _ => bail!("no dates in the data; pass --start and --end"),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let cli = Cli::parse();
    let sources = DataSources {
        data_dir: cli.data_dir,
        daily_file: cli.daily_file,
        hourly_file: cli.hourly_file,
    };

    let datasets = DataLoader::new(sources.clone())
        .load()
        .with_context(|| format!("failed to load data from {}", sources.data_dir.display()))?;

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => run_gui(sources, datasets),
        Commands::Report { range, json } => {
            let range = range.resolve(&datasets)?;
            let summary = DashboardSummary::compute(&datasets, range)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", report::render_text(&summary));
            }
            Ok(())
        }
        Commands::Export {
            out,
            range,
            width,
            height,
        } => {
            let range = range.resolve(&datasets)?;
            let summary = DashboardSummary::compute(&datasets, range)?;
            let paths = StaticChartRenderer::export_all(&summary, &out, (width, height))
                .with_context(|| format!("failed to export charts to {}", out.display()))?;
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn run_gui(sources: DataSources, datasets: Datasets) -> Result<()> {
    info!(
        daily_rows = datasets.daily.len(),
        hourly_rows = datasets.hourly.len(),
        "starting dashboard"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Bike Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, sources, datasets)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {}", e))
}
