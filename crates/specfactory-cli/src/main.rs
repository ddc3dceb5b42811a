// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::Result;
use clap::{Parser, Subcommand};
use specfactory_cli::commands;
use specfactory_cli::config::Mode;
use specfactory_cli::format::{Formatter, OutputFormat};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Exit code for runtime errors (pipeline `Err`, not a terminal stop reason).
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "specfactory", version, about = "SpecFactory product-spec harvesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for run results, billing reports, and explain-unk rows.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: OutputFormat,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Path to the engine config TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the category's field schema JSON file.
    #[arg(long, global = true)]
    schema: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one product to a mode-bounded round cap.
    Run {
        /// `category/product_id`, matching the input JSON's storage key.
        #[arg(long)]
        product_key: String,

        /// Round-count posture.
        #[arg(long, value_enum, default_value = "balanced")]
        mode: Mode,
    },

    /// Run one product to a caller-supplied round cap at maximum effort.
    RunUntilComplete {
        /// `category/product_id`, matching the input JSON's storage key.
        #[arg(long)]
        product_key: String,

        /// Hard round cap.
        #[arg(long)]
        max_rounds: u32,
    },

    /// Print the aggregated LLM cost ledger for one month.
    BillingReport {
        /// `YYYY-MM`.
        #[arg(long)]
        month: String,
    },

    /// Explain why a field is still `unk` for the most recent run of a product.
    ExplainUnk {
        /// Product category.
        #[arg(long)]
        category: String,

        /// Brand name.
        #[arg(long)]
        brand: String,

        /// Model name.
        #[arg(long)]
        model: String,
    },
}

fn default_schema_path(category: &str) -> PathBuf {
    PathBuf::from("schemas").join(format!("{category}.json"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug { EnvFilter::new("specfactory=debug") } else { EnvFilter::new("specfactory=info") };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let formatter = Formatter::new(cli.log_format);
    let config_path = cli.config.as_deref();

    let result = run(&cli.command, config_path, cli.schema.as_deref(), &formatter).await;

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", formatter.format_error(&format!("{e:#}")));
            std::process::exit(EXIT_RUNTIME_ERROR);
        }
    }
}

async fn run(
    command: &Commands,
    config_path: Option<&std::path::Path>,
    schema_path_override: Option<&std::path::Path>,
    formatter: &Formatter,
) -> Result<i32> {
    match command {
        Commands::Run { product_key, mode } => {
            let category = product_key.split_once('/').map(|(c, _)| c).unwrap_or(product_key);
            let schema_path = schema_path_override.map(Path::to_path_buf).unwrap_or_else(|| default_schema_path(category));
            let (summaries, code) = commands::cmd_run(product_key, *mode, config_path, &schema_path).await?;
            println!("{}", formatter.format_run(&summaries));
            Ok(i32::from(code))
        }
        Commands::RunUntilComplete { product_key, max_rounds } => {
            let category = product_key.split_once('/').map(|(c, _)| c).unwrap_or(product_key);
            let schema_path = schema_path_override.map(Path::to_path_buf).unwrap_or_else(|| default_schema_path(category));
            let (summaries, code) =
                commands::cmd_run_until_complete(product_key, *max_rounds, config_path, &schema_path).await?;
            println!("{}", formatter.format_run(&summaries));
            Ok(i32::from(code))
        }
        Commands::BillingReport { month } => {
            let report = commands::cmd_billing_report(month, config_path).await?;
            println!("{}", formatter.format_billing_report(&report));
            Ok(0)
        }
        Commands::ExplainUnk { category, brand, model } => {
            let schema_path = schema_path_override.map(Path::to_path_buf).unwrap_or_else(|| default_schema_path(category));
            let rows = commands::cmd_explain_unk(category, brand, model, config_path, &schema_path).await?;
            println!("{}", formatter.format_explain_unk(&rows));
            Ok(0)
        }
    }
}
