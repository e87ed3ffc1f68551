//! vquery - parse a filter query and print its AST as JSON
//!
//! Usage:
//!     vquery --fields severity,tags 'severity > 2 | tags in (a, b)'
//!     vquery --config fields.json --pretty '"CVE-2020-123"'

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vquery_parser::{Parser, ParserConfig};

#[derive(ClapParser, Debug)]
#[command(name = "vquery")]
#[command(about = "Parse a vquery filter expression and print the AST as JSON")]
#[command(version)]
struct Args {
    /// Query to parse
    query: String,

    /// Comma-separated list of valid field names
    #[arg(short, long, value_delimiter = ',')]
    fields: Vec<String>,

    /// JSON parser config; --fields are added to its field set
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<ParserConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            ParserConfig::from_json(&raw)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => ParserConfig::default(),
    };
    config.fields.extend(args.fields.iter().cloned());
    Ok(config)
}

/// RUST_LOG wins over `--log-level`; logs go to stderr so stdout stays JSON.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(fields = config.fields.len(), "loaded parser config");

    let queries = match Parser::new(&args.query, &config).parse() {
        Ok(queries) => queries,
        Err(e) => {
            eprintln!("{}", e.render());
            return ExitCode::FAILURE;
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&queries)
    } else {
        serde_json::to_string(&queries)
    };

    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to serialize AST: {e}");
            ExitCode::FAILURE
        }
    }
}
