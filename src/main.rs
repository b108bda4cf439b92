use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use streamboard::analytics::filter::{DEFAULT_SCORE_RANGE, DEFAULT_YEAR_RANGE};
use streamboard::analytics::FilterState;
use streamboard::app::{CleanUseCase, ViewSession};
use streamboard::config::Config;
use streamboard::constants::DEFAULT_CONFIG_FILE;
use streamboard::domain::TrackType;
use streamboard::infra::CsvFileSink;
use streamboard::observability::init_logging;
use streamboard::pipeline::ingestion::TextEncoding;

#[derive(Parser)]
#[command(name = "streamboard")]
#[command(about = "Most Streamed Spotify Songs 2024: data cleaning and analytics")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw export and write the cleaned file
    Clean {
        /// Raw CSV to read
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the cleaned CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Input encoding: latin1, utf8 or utf8-lossy
        #[arg(long)]
        encoding: Option<TextEncoding>,
    },
    /// Show the analytics dashboard for the cleaned file
    View(ViewArgs),
    /// Clean, then show the dashboard with default filters
    Run,
}

#[derive(Args)]
struct ViewArgs {
    /// Cleaned CSV to read
    #[arg(long)]
    input: Option<PathBuf>,
    /// Track types to include (comma-separated): explicit, clean
    #[arg(long, value_delimiter = ',')]
    track_type: Vec<String>,
    #[arg(long)]
    year_min: Option<i32>,
    #[arg(long)]
    year_max: Option<i32>,
    #[arg(long)]
    score_min: Option<f64>,
    #[arg(long)]
    score_max: Option<f64>,
    /// Also write the JSON chart specification to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Start from the full-range selection and narrow it with whatever flags were given
fn build_filters(session: &mut ViewSession, args: &ViewArgs) -> Result<FilterState> {
    let mut filters = session.default_filters()?;

    if !args.track_type.is_empty() {
        let mut types = Vec::with_capacity(args.track_type.len());
        for raw in &args.track_type {
            match TrackType::parse(raw) {
                Some(t) => types.push(t),
                None => bail!("Unknown track type '{}'; expected explicit or clean", raw),
            }
        }
        filters = filters.with_track_types(types);
    }

    if args.year_min.is_some() || args.year_max.is_some() {
        let (lo, hi) = filters.year_range.unwrap_or(DEFAULT_YEAR_RANGE);
        filters = filters.with_year_range(args.year_min.unwrap_or(lo), args.year_max.unwrap_or(hi));
    }
    if args.score_min.is_some() || args.score_max.is_some() {
        let (lo, hi) = filters.score_range.unwrap_or(DEFAULT_SCORE_RANGE);
        filters =
            filters.with_score_range(args.score_min.unwrap_or(lo), args.score_max.unwrap_or(hi));
    }

    debug!(?filters, "Resolved filters");
    Ok(filters)
}

fn run_clean(input: PathBuf, output: PathBuf, encoding: TextEncoding) -> Result<()> {
    println!("🧹 Cleaning {}...", input.display());
    let use_case = CleanUseCase::with_default_pipeline(Box::new(CsvFileSink::new(output)));
    let report = use_case.run(&input, encoding)?;
    println!("{}", report);
    Ok(())
}

fn run_view(config: &Config, args: &ViewArgs) -> Result<()> {
    let input = args.input.clone().unwrap_or_else(|| config.paths.output.clone());
    let mut session = ViewSession::open(input);
    let filters = build_filters(&mut session, args)?;

    print!("{}", session.text_report(&filters)?);

    if let Some(path) = &args.json {
        let spec = session.chart_spec(&filters)?;
        let json = serde_json::to_string_pretty(&spec)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write chart spec to {}", path.display()))?;
        println!("📄 Chart spec saved to: {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load_with_env(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let _log_guard = init_logging(&config.logging);
    info!(config = %cli.config.display(), "Starting streamboard");

    match cli.command {
        Commands::Clean {
            input,
            output,
            encoding,
        } => run_clean(
            input.unwrap_or(config.paths.input.clone()),
            output.unwrap_or(config.paths.output.clone()),
            encoding.unwrap_or(config.ingest.encoding),
        )?,
        Commands::View(args) => run_view(&config, &args)?,
        Commands::Run => {
            run_clean(
                config.paths.input.clone(),
                config.paths.output.clone(),
                config.ingest.encoding,
            )?;
            let args = ViewArgs {
                input: None,
                track_type: Vec::new(),
                year_min: None,
                year_max: None,
                score_min: None,
                score_max: None,
                json: None,
            };
            run_view(&config, &args)?;
        }
    }

    Ok(())
}
