//! Command-line parsing for the `psig` telemetry analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the signal-processing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "psig", version, about = "Power-signal analysis: shifts, decays, formulas, energy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate how many samples (and seconds) one series trails another.
    Shift(ShiftArgs),
    /// Fit `a·e^(b·t) + c` to a series over a time window.
    Decay(DecayArgs),
    /// Evaluate a `+`/`-` formula over named series.
    Derive(DeriveArgs),
    /// Total energy (kWh) of a power series.
    Energy(EnergyArgs),
    /// Run shift, decay, derive and energy on synthetic data.
    Demo(DemoArgs),
}

/// Options shared by every command that reads a CSV data set.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV file: `timestamp,NAME…`, optional `units,…` row.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Treat `0` readings as missing samples (legacy feeds).
    #[arg(long)]
    pub zero_is_missing: bool,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ShiftArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Series the shift is measured against.
    #[arg(long)]
    pub reference: String,

    /// Series whose shift is estimated.
    #[arg(long)]
    pub signal: String,

    /// Maximum lag (samples) of the cross-correlation [env: PSIG_KERNEL_RADIUS].
    #[arg(short = 'k', long)]
    pub kernel_radius: Option<usize>,

    /// Half-width (samples) of the sub-sample peak search [env: PSIG_SEARCH_RADIUS].
    #[arg(short = 's', long)]
    pub search_radius: Option<f64>,

    /// Write the time base, the reference and the re-aligned signal to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_aligned: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DecayArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Series to fit.
    #[arg(long)]
    pub series: String,

    /// Window start (seconds, same clock as the CSV time column).
    #[arg(long)]
    pub from: Option<f64>,

    /// Window end.
    #[arg(long)]
    pub to: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Formula such as `SOLAR - PROD + USAGE`.
    #[arg(short, long)]
    pub formula: String,

    /// Name of the derived series (defaults to the formula text).
    #[arg(long)]
    pub name: Option<String>,

    /// Write the time base and derived series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EnergyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Power series (W).
    #[arg(long)]
    pub series: String,

    /// Window start (requires --to).
    #[arg(long, requires = "to")]
    pub from: Option<f64>,

    /// Window end (requires --from).
    #[arg(long, requires = "from")]
    pub to: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Random seed for the synthetic data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Delay (samples) of the synthetic delayed series.
    #[arg(long, default_value_t = 3.4)]
    pub delay: f64,

    /// Write the synthetic data set to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}
