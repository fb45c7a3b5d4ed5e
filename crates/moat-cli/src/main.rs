//! Command-line interface for moat-screen
//!
//! # Usage
//!
//! ```bash
//! export FMP_API_KEY="your-key"
//! moat-screen NVDA,AAPL MSFT --output moat_analysis.csv
//! echo "TSM\nASML" | moat-screen --provider yahoo --format json
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use moat_screen::{
    BatchReport, DataProvider, MoatLists, ScreenConfig, Screener, build_source, parse_symbols,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    /// Financial Modeling Prep (requires an API key)
    Fmp,
    /// Yahoo Finance (no key, no composite scores)
    Yahoo,
}

impl From<Provider> for DataProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Fmp => DataProvider::Fmp,
            Provider::Yahoo => DataProvider::Yahoo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "moat-screen", version)]
#[command(about = "Screen ticker symbols for moat strength and valuation", long_about = None)]
struct Args {
    /// Ticker symbols, comma or newline separated; read from stdin when omitted
    symbols: Vec<String>,

    /// Read ticker symbols from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Data provider
    #[arg(short, long, value_enum, default_value_t = Provider::Fmp)]
    provider: Provider,

    /// FMP API key (defaults to the FMP_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Maximum provider requests per minute
    #[arg(long, default_value_t = 300)]
    rate_limit: u32,

    /// JSON file with network_effect, switching_cost and policy_risk lists
    #[arg(long)]
    moat_lists: Option<PathBuf>,

    /// Write the CSV export to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format printed to stdout
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn raw_symbols(&self) -> anyhow::Result<String> {
        let mut raw = self.symbols.join("\n");

        if let Some(path) = &self.file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read symbols from {}", path.display()))?;
            raw.push('\n');
            raw.push_str(&contents);
        } else if self.symbols.is_empty() && !std::io::stdin().is_terminal() {
            std::io::stdin().read_to_string(&mut raw)?;
        }

        Ok(raw)
    }

    fn config(&self) -> anyhow::Result<ScreenConfig> {
        let mut builder = ScreenConfig::builder()
            .provider(self.provider.into())
            .request_timeout(Duration::from_secs(self.timeout_secs))
            .rate_limit_per_minute(self.rate_limit);

        if let Some(key) = &self.api_key {
            builder = builder.fmp_api_key(key);
        }

        builder
            .with_env_api_key()
            .build()
            .context("invalid configuration")
    }

    fn lists(&self) -> anyhow::Result<MoatLists> {
        match &self.moat_lists {
            Some(path) => MoatLists::load(path)
                .with_context(|| format!("failed to load moat lists from {}", path.display())),
            None => Ok(MoatLists::default()),
        }
    }
}

fn progress_bar(length: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn print_report(report: &BatchReport, format: Format) -> anyhow::Result<()> {
    for advisory in &report.advisories {
        eprintln!("⚠️  {advisory}");
    }

    if report.table.is_empty() {
        eprintln!("No symbol returned both profile and metrics data.");
        return Ok(());
    }

    match format {
        Format::Table => println!("{}", report.table.render()),
        Format::Json => println!("{}", report.table.to_json()?),
    }
    Ok(())
}

/// Write the CSV export; an empty table leaves `path` untouched
fn export(report: &BatchReport, path: &Path) -> anyhow::Result<bool> {
    if report.table.is_empty() {
        eprintln!("⚠️  No results to export; {} not written.", path.display());
        return Ok(false);
    }

    report
        .table
        .export_csv(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("📥 Saved {} rows to {}", report.table.len(), path.display());
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        moat_utils::logging::init_tracing_with("warn,moat_screen=debug");
    } else {
        moat_utils::init_tracing();
    }

    let symbols = parse_symbols(&args.raw_symbols()?);
    if symbols.is_empty() {
        eprintln!("⚠️  No ticker symbols given; nothing to analyze.");
        return Ok(());
    }

    let config = args.config()?;
    let screener = Screener::new(build_source(&config)?, args.lists()?);

    info!("Starting batch of {} symbols", symbols.len());

    let pb = progress_bar(symbols.len() as u64)?;
    let report = screener
        .run_with_progress(&symbols, |progress| {
            pb.set_message(progress.symbol.to_string());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    print_report(&report, args.format)?;

    if let Some(path) = &args.output {
        export(&report, path)?;
    }

    info!(
        "Finished: {} rows, {} dropped",
        report.table.len(),
        report.dropped()
    );

    Ok(())
}
