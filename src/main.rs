//! CLI entry point for the dwelling statistics tool.
//!
//! Loads the census and neighbourhood-location tables once, builds every
//! derived view, then logs them, exports dwelling totals, or writes a JSON
//! report for the dashboard.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dwelling_stats::analyzers::aggregate::dwelling_type_totals_by_year;
use dwelling_stats::analyzers::analyzer::{Report, analyze};
use dwelling_stats::config::Settings;
use dwelling_stats::output::{
    print_json, print_pretty, print_summary, write_dwelling_totals, write_report,
};
use dwelling_stats::parser::load_census;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dwelling_stats")]
#[command(about = "Descriptive statistics over neighbourhood census data", long_about = None)]
struct Cli {
    /// Census CSV (overrides CENSUS_DATA_PATH)
    #[arg(long, global = true)]
    census: Option<PathBuf>,

    /// Neighbourhood coordinates CSV (overrides LOCATION_DATA_PATH)
    #[arg(long, global = true)]
    locations: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every derived view and log it
    Summary {
        /// Number of neighbourhoods in ranked views
        #[arg(short, long, default_value_t = 10)]
        top: usize,

        /// Log the derived tables as JSON instead of debug format
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write summed dwelling-type counts per year as CSV
    ExportDwellings {
        /// CSV file to write
        #[arg(short, long, default_value = "Data/sum_of_dwelling_by_year.csv")]
        output: PathBuf,
    },
    /// Write all derived views as a JSON report
    Report {
        /// JSON file to write
        #[arg(short, long, default_value = "Data/report.json")]
        output: PathBuf,

        /// Number of neighbourhoods in ranked views
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("dwelling_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let (census_path, locations_path) = settings.input_paths(cli.census, cli.locations);
    debug!(
        ?settings,
        census_path = %census_path.display(),
        locations_path = %locations_path.display(),
        "Settings loaded"
    );

    match cli.command {
        Commands::Summary { top, json } => {
            let tables = analyze(&census_path, &locations_path, top)?;
            print_summary(&tables);
            if json {
                print_json(&tables)?;
            } else {
                print_pretty(&tables);
            }
        }
        Commands::ExportDwellings { output } => {
            let records = load_census(&census_path)?;
            let totals = dwelling_type_totals_by_year(&records);
            write_dwelling_totals(&output, &totals)?;
            info!(
                output = %output.display(),
                years = totals.len(),
                "Dwelling totals exported"
            );
        }
        Commands::Report { output, top } => {
            let tables = analyze(&census_path, &locations_path, top)?;
            let report = Report::new(tables, settings.has_mapbox_token());
            write_report(&output, &report)?;
            info!(
                output = %output.display(),
                map_token_configured = report.map_token_configured,
                "Report written"
            );
        }
    }

    Ok(())
}
