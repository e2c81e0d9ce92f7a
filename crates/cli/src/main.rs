use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use filter_engine::{AdapterConfig, FilterAdapter};
use filter_eval::{Record, evaluate};
use filter_model::Filter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "filterc",
    version = "0.1.0",
    about = "Translate and evaluate query filters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Translate {
            input,
            format,
            max_depth,
        } => {
            let adapter = build_adapter(max_depth)?;
            let filter = load_filter(&input)?;
            info!("Translating {} as {:?}", input, format);
            println!("{}", output::render(&adapter, &filter, format)?);
        }
        Commands::Eval {
            input,
            record,
            max_depth,
        } => {
            let adapter = build_adapter(max_depth)?;
            let filter = load_filter(&input)?;
            let record = load_record(&record)?;
            let matched = evaluate(&adapter, &filter, &record)?;
            info!("Filter {} evaluated to {}", input, matched);
            println!("{matched}");
        }
    }

    Ok(())
}

fn build_adapter(max_depth: Option<usize>) -> Result<FilterAdapter, CliError> {
    let config = match max_depth {
        Some(depth) => AdapterConfig::with_max_depth(depth)?,
        None => AdapterConfig::from_env()?,
    };
    debug!("Adapter config: {:?}", config);
    Ok(FilterAdapter::with_config(config))
}

fn load_filter(path: &str) -> Result<Filter, CliError> {
    let source = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&source)?)
}

fn load_record(path: &str) -> Result<Record, CliError> {
    let source = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&source)?;
    Ok(Record::try_from(json)?)
}
