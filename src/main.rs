//! `deadstock` command line: forecast when a tank reaches dead stock.

use anyhow::{bail, Context, Result};
use clap::Parser;
use deadstock::config::PipelineConfig;
use deadstock::error::DepletionError;
use deadstock::fuel::FuelType;
use deadstock::io::{summary_lines, write_comparison_file, CsvReadingSource, ReadingQuery};
use deadstock::pipeline::Pipeline;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deadstock")]
#[command(author, version, about = "Hourly fuel tank depletion forecast")]
#[command(
    long_about = "Forecast hourly consumption for one tank, project the tank level forward\n\
    and report when it reaches dead stock, with forecast accuracy against actuals.\n\
    \nExamples:\n  \
    deadstock --data readings.csv --station Z313 --fuel Аи-92\n  \
    deadstock --data readings.csv --station Z313 --fuel AI-95 --tank 2 --config run.toml"
)]
struct Cli {
    /// CSV export of hourly readings (date,hour,fuel,tank,quantity)
    #[arg(long)]
    data: PathBuf,

    /// Station code
    #[arg(long)]
    station: String,

    /// Fuel grade (display name, Latin alias or id); prompted for when absent
    #[arg(long)]
    fuel: Option<String>,

    /// Tank number, overrides the configuration file
    #[arg(long)]
    tank: Option<u32>,

    /// Initial tank volume, overrides the configuration file
    #[arg(long)]
    initial_volume: Option<f64>,

    /// Dead stock level, overrides the configuration file
    #[arg(long)]
    dead_stock: Option<f64>,

    /// TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the forecast comparison
    #[arg(long, default_value = "forecast_dates.csv")]
    output: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deadstock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn prompt_fuel() -> Result<FuelType> {
    println!("Available fuels:");
    for (i, fuel) in FuelType::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, fuel);
    }
    print!("Fuel: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read fuel from stdin")?;
    let answer = line.trim();
    if answer.is_empty() {
        bail!("no fuel given");
    }

    if let Ok(n) = answer.parse::<usize>() {
        if let Some(fuel) = n.checked_sub(1).and_then(|i| FuelType::ALL.get(i)) {
            return Ok(*fuel);
        }
    }
    Ok(answer.parse()?)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Exit status from the library error behind `err`, 1 for anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DepletionError>())
        .map_or(1, |e| e.category().exit_code())
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(tank) = cli.tank {
        config.tank = tank;
    }
    if let Some(volume) = cli.initial_volume {
        config.initial_volume = volume;
    }
    if let Some(level) = cli.dead_stock {
        config.dead_stock = level;
    }

    let fuel = match &cli.fuel {
        Some(name) => name.parse::<FuelType>()?,
        None => prompt_fuel()?,
    };

    let query = ReadingQuery::new(cli.station.clone(), fuel, config.tank);
    let source = CsvReadingSource::new(&cli.data);
    let pipeline = Pipeline::new(config).context("invalid configuration")?;

    let report = pipeline
        .run_from_source(&source, &query)
        .with_context(|| {
            format!(
                "forecast failed for station {} fuel {} tank {}",
                query.station, query.fuel, query.tank
            )
        })?;

    write_comparison_file(&cli.output, &report.accuracy.records)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    tracing::info!(path = %cli.output.display(), "comparison written");

    for line in summary_lines(&report.depletion, &report.accuracy) {
        println!("{}", line);
    }

    Ok(())
}
