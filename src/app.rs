//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging and loads settings
//! - parses CLI arguments
//! - loads and standardizes the CSV data set
//! - runs the requested analysis
//! - prints text or JSON and writes optional exports

use clap::Parser;

use crate::cli::{Command, DecayArgs, DemoArgs, DeriveArgs, EnergyArgs, InputArgs, ShiftArgs};
use crate::config::Settings;
use crate::data::{BOILER, DELAYED, LOAD, PV, REFERENCE, SampleConfig, generate_sample};
use crate::error::AppError;
use crate::io::{IngestedData, MissingPolicy};

pub mod pipeline;

/// Entry point for the `psig` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = crate::cli::Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Shift(args) => handle_shift(args, &settings),
        Command::Decay(args) => handle_decay(args, &settings),
        Command::Derive(args) => handle_derive(args, &settings),
        Command::Energy(args) => handle_energy(args, &settings),
        Command::Demo(args) => handle_demo(args, &settings),
    }
}

fn load(args: &InputArgs, settings: &Settings) -> Result<IngestedData, AppError> {
    let policy = if args.zero_is_missing {
        MissingPolicy::NullOrZero
    } else {
        MissingPolicy::NullOnly
    };
    let ingest = pipeline::load_standardized(&args.input, policy, settings)?;
    if !args.json {
        println!("{}", crate::report::format_data_summary(&ingest));
    }
    Ok(ingest)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", crate::io::to_json_string(value)?);
    Ok(())
}

fn handle_shift(args: ShiftArgs, settings: &Settings) -> Result<(), AppError> {
    let ingest = load(&args.input, settings)?;
    let kernel_radius = args.kernel_radius.unwrap_or(settings.kernel_radius);
    let search_radius = args.search_radius.unwrap_or(settings.search_radius);

    let run = pipeline::run_shift(
        &ingest.data,
        &args.reference,
        &args.signal,
        kernel_radius,
        search_radius,
    )?;

    if args.input.json {
        print_json(&run)?;
    } else {
        println!("{}", crate::report::format_shift(&run));
    }

    if let Some(path) = &args.export_aligned {
        let reference = pipeline::require(&ingest.data, &args.reference)?;
        let aligned = run.aligned.clone().renamed(format!("{}_aligned", run.signal));
        crate::io::write_series_csv(path, ingest.data.time(), &[reference, &aligned])?;
    }
    Ok(())
}

fn handle_decay(args: DecayArgs, settings: &Settings) -> Result<(), AppError> {
    let ingest = load(&args.input, settings)?;
    let (start, end) = ingest
        .data
        .time()
        .span()
        .ok_or_else(|| AppError::new(3, "Data set has no time stamps."))?;
    let window = (args.from.unwrap_or(start), args.to.unwrap_or(end));

    let run = pipeline::run_decay(&ingest.data, &args.series, window)?;
    if args.input.json {
        print_json(&run)
    } else {
        println!("{}", crate::report::format_decay(&run));
        Ok(())
    }
}

fn handle_derive(args: DeriveArgs, settings: &Settings) -> Result<(), AppError> {
    let ingest = load(&args.input, settings)?;
    let run = pipeline::run_derive(&ingest.data, &args.formula, args.name.as_deref())?;

    if args.input.json {
        print_json(&run)?;
    } else {
        println!("{}", crate::report::format_derived(&run, ingest.data.time()));
    }
    if let Some(path) = &args.export {
        crate::io::write_series_csv(path, ingest.data.time(), &[&run.series])?;
    }
    Ok(())
}

fn handle_energy(args: EnergyArgs, settings: &Settings) -> Result<(), AppError> {
    let ingest = load(&args.input, settings)?;
    let window = args.from.zip(args.to);
    let run = pipeline::run_energy(&ingest.data, &args.series, window)?;
    if args.input.json {
        print_json(&run)
    } else {
        print!("{}", crate::report::format_energy(&run));
        Ok(())
    }
}

/// Results of every analysis on one synthetic data set.
#[derive(Debug, serde::Serialize)]
struct DemoOutput {
    seed: u64,
    true_delay: f64,
    true_half_life: f64,
    shift: pipeline::ShiftRun,
    decay: pipeline::DecayRun,
    derive: pipeline::DeriveRun,
    energy: pipeline::EnergyRun,
}

fn handle_demo(args: DemoArgs, settings: &Settings) -> Result<(), AppError> {
    let config = SampleConfig {
        seed: args.seed,
        delay: args.delay,
        ..SampleConfig::default()
    };
    let mut sample = generate_sample(&config)?;
    if let Some(path) = &args.export {
        let series: Vec<_> = sample.data.iter().collect();
        crate::io::write_series_csv(path, sample.data.time(), &series)?;
    }
    settings.standardizer().standardize(&mut sample.data);
    let data = &sample.data;

    let (start, end) = data
        .time()
        .span()
        .ok_or_else(|| AppError::new(3, "Synthetic data set is empty."))?;
    let output = DemoOutput {
        seed: config.seed,
        true_delay: config.delay,
        true_half_life: config.half_life,
        shift: pipeline::run_shift(
            data,
            REFERENCE,
            DELAYED,
            settings.kernel_radius,
            settings.search_radius,
        )?,
        decay: pipeline::run_decay(data, BOILER, (start, end))?,
        derive: pipeline::run_derive(data, &format!("{LOAD} - {PV}"), Some("GRID"))?,
        energy: pipeline::run_energy(data, LOAD, None)?,
    };

    if args.json {
        return print_json(&output);
    }

    println!(
        "Synthetic data: seed={} delay={} samples half-life={}\n",
        output.seed,
        output.true_delay,
        crate::report::format_duration(output.true_half_life)
    );
    println!("{}", crate::report::format_shift(&output.shift));
    println!("{}", crate::report::format_decay(&output.decay));
    println!("{}", crate::report::format_derived(&output.derive, data.time()));
    print!("{}", crate::report::format_energy(&output.energy));
    Ok(())
}
