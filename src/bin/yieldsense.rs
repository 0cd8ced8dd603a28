//! Command-line entrypoint for YieldSense.
//! Every command prints its result as pretty JSON on stdout; logs go to
//! stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use yieldsense::config::{generate_commented_config_template, Config};
use yieldsense::forecast::{DriftForecaster, Forecaster, NullForecaster};
use yieldsense::utils::init_logging;
use yieldsense::{BoundsService, ConfidenceLevel};

#[derive(Debug, Parser)]
#[command(name = "yieldsense", author, version, about = "Seven-day price bounds for yield farming", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML); defaults to ./config.toml, then
    /// the user config directory
    #[arg(short, long)]
    config: Option<String>,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Forecast model backing the forecast signal
    #[arg(long, value_enum, default_value_t = ForecasterKind::Drift)]
    forecaster: ForecasterKind,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ForecasterKind {
    /// Momentum projection of recent returns
    Drift,
    /// No model; always the neutral signal
    #[value(name = "none")]
    Disabled,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predicted 7-day range and safety score for one asset
    Bounds {
        symbol: String,
        /// Current price; the live quote is used when omitted
        #[arg(long)]
        price: Option<f64>,
        /// Confidence level (0.68, 0.80, 0.90, 0.95)
        #[arg(long)]
        confidence: Option<f64>,
    },
    /// Recent-news sentiment for one asset
    News { symbol: String },
    /// Farming verdict for a liquidity pair
    Pair {
        token_a: String,
        token_b: String,
        #[arg(long)]
        price_a: Option<f64>,
        #[arg(long)]
        price_b: Option<f64>,
    },
    /// Bounds for several assets at once
    Multi {
        #[arg(required = true, num_args = 1..)]
        symbols: Vec<String>,
        #[arg(long)]
        confidence: Option<f64>,
    },
    /// List the calibrated assets
    Tokens,
    /// Write a commented default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
struct TokenInfo<'a> {
    symbol: String,
    stablecoin: bool,
    mint: Option<&'a str>,
    max_range_pct: f64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        | Some(path) if Path::new(path).exists() => {
            Config::from_file(path).with_context(|| format!("Failed to load configuration from {}", path))
        }
        | _ => Config::load().context("Failed to load configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", Config::default_toml()?);
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.app.log_level);

    let Some(command) = args.command else {
        log::warn!("No command given; try `yieldsense --help`");
        return Ok(());
    };

    if let Command::Init { force } = &command {
        let path = PathBuf::from(args.config.as_deref().unwrap_or("config.toml"));
        if path.exists() && !force {
            anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
        }
        generate_commented_config_template(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let forecaster: Arc<dyn Forecaster> = match args.forecaster {
        | ForecasterKind::Drift => Arc::new(DriftForecaster::default()),
        | ForecasterKind::Disabled => Arc::new(NullForecaster),
    };
    let service = BoundsService::from_config(&config, forecaster).context("Failed to build bounds service")?;
    let confidence =
        |raw: Option<f64>| raw.map(ConfidenceLevel::from_f64).unwrap_or_else(|| config.default_confidence_level());

    match command {
        | Command::Bounds { symbol, price, confidence: level } => {
            let result = service.bounds(&symbol, price, confidence(level)).await;
            print_json(&result)
        }
        | Command::News { symbol } => print_json(&service.news_report(&symbol).await),
        | Command::Pair { token_a, token_b, price_a, price_b } => {
            print_json(&service.pair_analysis(&token_a, &token_b, price_a, price_b).await)
        }
        | Command::Multi { symbols, confidence: level } => {
            print_json(&service.multi_bounds(&symbols, confidence(level)).await)
        }
        | Command::Tokens => {
            let table = service.engine().calibration_table();
            let tokens: Vec<TokenInfo> = table
                .symbols()
                .into_iter()
                .map(|s| {
                    let profile = table.profile(s);
                    TokenInfo {
                        symbol: s.to_uppercase(),
                        stablecoin: profile.stablecoin,
                        mint: profile.mint.as_deref(),
                        max_range_pct: profile.calibration.max_range_fraction * 100.0,
                    }
                })
                .collect();
            print_json(&tokens)
        }
        | Command::Init { .. } => Ok(()),
    }
}
