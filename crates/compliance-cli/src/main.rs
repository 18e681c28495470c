//! Nessus Compliance Reporter CLI
//!
//! The `nessus-compliance` command turns one or more Nessus compliance scan
//! exports into a single report.
//!
//! ```text
//! nessus-compliance week1.nessus week2.nessus -o Compliance_Summary.xlsx
//! ```
//!
//! Inputs are folded in the order given; with the default `overwrite`
//! policy a host scanned again in a later file keeps only its latest checks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use compliance_core::{ConversionOutcome, MergePolicy, OutputFormat, ReportConfig};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "nessus-compliance")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Convert Nessus compliance scans into a per-host spreadsheet report",
    long_about = None
)]
struct Cli {
    /// Nessus `.nessus` exports, folded in the order given
    #[arg(required = true, num_args = 1.., value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output path (default: Compliance_Summary.xlsx or .csv)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// How a host seen in several inputs is combined
    #[arg(long, value_enum)]
    merge: Option<MergeArg>,

    /// Color Result cells by status
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Leave Result cells uncolored, even if the config enables colors
    #[arg(long, overrides_with = "color")]
    no_color: bool,

    /// Font used for every cell
    #[arg(long)]
    font: Option<String>,

    /// Keep line breaks and repeated spaces in cell text
    #[arg(long, overrides_with = "no_raw_text")]
    raw_text: bool,

    /// Clean up cell text, even if the config asks for raw text
    #[arg(long, overrides_with = "raw_text")]
    no_raw_text: bool,

    /// Also write a JSON run summary to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "NESSUS_COMPLIANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MergeArg {
    /// Latest input replaces all earlier checks of a host
    Overwrite,
    /// Latest input replaces checks with the same name
    Merge,
    /// Keep every check from every input
    Append,
}

impl From<MergeArg> for MergePolicy {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::Overwrite => MergePolicy::Overwrite,
            MergeArg::Merge => MergePolicy::Merge,
            MergeArg::Append => MergePolicy::Append,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    compliance_core::init_tracing(cli.json, level);

    let outcome = cmd_convert(&cli)?;
    println!("{}", outcome.output.display());
    if let Some(summary) = &outcome.summary_path {
        println!("{}", summary.display());
    }
    Ok(())
}

/// Defaults, then the config file, then flags.
fn resolve_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if let Some(merge) = cli.merge {
        config.merge_policy = merge.into();
    }
    if let Some(color) = switch(cli.color, cli.no_color) {
        config.status_colors = color;
    }
    if let Some(font) = &cli.font {
        config.font_name = font.clone();
    }
    if let Some(raw) = switch(cli.raw_text, cli.no_raw_text) {
        config.raw_text = raw;
    }
    if let Some(path) = &cli.summary_json {
        config.summary_json = Some(path.clone());
    }

    config.validate().context("Invalid options")?;
    Ok(config)
}

/// `Some` when either side of a `--x` / `--no-x` pair was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn output_path(cli: &Cli, config: &ReportConfig) -> PathBuf {
    cli.out
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.format.default_file_name()))
}

fn cmd_convert(cli: &Cli) -> Result<ConversionOutcome> {
    let config = resolve_config(cli)?;
    let destination = output_path(cli, &config);

    info!(
        inputs = cli.inputs.len(),
        format = %config.format,
        merge_policy = %config.merge_policy,
        "Converting compliance scans"
    );

    compliance_core::convert(&cli.inputs, &config, &destination)
        .with_context(|| format!("Failed to produce {}", destination.display()))
}
