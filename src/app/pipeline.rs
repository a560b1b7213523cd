//! Analysis pipelines shared by every `psig` subcommand.
//!
//! Each function takes an already loaded (and unit-standardized) data set and
//! returns a serializable result; printing and exporting stay in `app`.

use serde::Serialize;

use crate::config::Settings;
use crate::domain::{DataSet, Series};
use crate::error::AppError;
use crate::fit::{DEFAULT_CURVE_STEPS, DecayFit, fit_decay_window};
use crate::formula::DerivedSignal;
use crate::io::{IngestedData, MissingPolicy, load_data_set};
use crate::signal::{CrossCorrelation, assess_shift, shift_series, total_energy};

/// Outcome of `psig shift`.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftRun {
    pub reference: String,
    pub signal: String,
    pub kernel_radius: usize,
    pub search_radius: f64,
    pub lag_samples: f64,
    pub sampling_time: Option<f64>,
    pub lag_seconds: Option<f64>,
    pub peak_correlation: Option<f64>,
    pub correlation: CrossCorrelation,
    /// `signal` moved back by the estimated lag.
    #[serde(skip)]
    pub aligned: Series,
}

/// Outcome of `psig decay`.
#[derive(Debug, Clone, Serialize)]
pub struct DecayRun {
    pub fit: DecayFit,
    pub curve: Vec<(f64, f64)>,
}

/// Outcome of `psig derive`.
#[derive(Debug, Clone, Serialize)]
pub struct DeriveRun {
    pub formula: String,
    pub series: Series,
}

/// Outcome of `psig energy`.
#[derive(Debug, Clone, Serialize)]
pub struct EnergyRun {
    pub series: String,
    pub unit: String,
    pub window: Option<(f64, f64)>,
    pub kwh: f64,
}

/// Load a CSV data set and convert its series to the preferred units.
pub fn load_standardized(
    path: &std::path::Path,
    policy: MissingPolicy,
    settings: &Settings,
) -> Result<IngestedData, AppError> {
    let mut ingested = load_data_set(path, policy)?;
    settings.standardizer().standardize(&mut ingested.data);
    Ok(ingested)
}

pub fn require<'a>(data: &'a DataSet, name: &str) -> Result<&'a Series, AppError> {
    data.get(name).ok_or_else(|| {
        let known: Vec<&str> = data.names().collect();
        AppError::new(
            2,
            format!("Unknown series '{name}'. Available: {}", known.join(", ")),
        )
    })
}

pub fn run_shift(
    data: &DataSet,
    reference: &str,
    signal: &str,
    kernel_radius: usize,
    search_radius: f64,
) -> Result<ShiftRun, AppError> {
    let reference_series = require(data, reference)?;
    let signal_series = require(data, signal)?;

    let estimate = assess_shift(reference_series, signal_series, kernel_radius, search_radius)?;
    let sampling_time = data.sampling_time();

    Ok(ShiftRun {
        reference: reference.to_string(),
        signal: signal.to_string(),
        kernel_radius,
        search_radius,
        lag_samples: estimate.lag_samples,
        sampling_time,
        lag_seconds: sampling_time.map(|dt| estimate.seconds(dt)),
        peak_correlation: estimate.peak_correlation,
        aligned: shift_series(signal_series, estimate.lag_samples),
        correlation: estimate.correlation,
    })
}

pub fn run_decay(data: &DataSet, series: &str, window: (f64, f64)) -> Result<DecayRun, AppError> {
    require(data, series)?;
    let fit = fit_decay_window(data, series, window)?;
    let curve = fit.curve(DEFAULT_CURVE_STEPS);
    Ok(DecayRun { fit, curve })
}

pub fn run_derive(data: &DataSet, formula: &str, name: Option<&str>) -> Result<DeriveRun, AppError> {
    let derived = DerivedSignal::new(name.unwrap_or(formula), formula)?;
    let series = derived.compute(data)?.ok_or_else(|| {
        let unknown: Vec<&str> = derived
            .formula()
            .leaves()
            .into_iter()
            .filter(|leaf| !data.contains(leaf))
            .collect();
        AppError::new(
            2,
            format!("Formula '{formula}' references unknown series: {}", unknown.join(", ")),
        )
    })?;
    Ok(DeriveRun {
        formula: formula.to_string(),
        series,
    })
}

pub fn run_energy(data: &DataSet, series: &str, window: Option<(f64, f64)>) -> Result<EnergyRun, AppError> {
    let unit = require(data, series)?.unit.clone();
    if unit != "W" {
        log::warn!("'{series}' is in '{unit}', energy assumes W");
    }
    let kwh = total_energy(data, series, window)?
        .ok_or_else(|| AppError::new(3, "Energy needs at least two time stamps."))?;
    Ok(EnergyRun {
        series: series.to_string(),
        unit,
        window,
        kwh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BOILER, DELAYED, LOAD, PV, REFERENCE, SampleConfig, generate_sample};

    fn sample_with(config: &SampleConfig) -> DataSet {
        let mut data = generate_sample(config).unwrap().data;
        Settings::default().standardizer().standardize(&mut data);
        data
    }

    fn sample() -> DataSet {
        sample_with(&SampleConfig::default())
    }

    #[test]
    fn shift_recovers_sample_delay() {
        let data = sample_with(&SampleConfig {
            gap_probability: 0.0,
            ..SampleConfig::default()
        });
        let run = run_shift(&data, REFERENCE, DELAYED, 10, 2.0).unwrap();
        assert!((run.lag_samples - 3.4).abs() < 0.3, "{}", run.lag_samples);
        assert_eq!(run.sampling_time, Some(300.0));
        assert!((run.lag_seconds.unwrap() - 300.0 * run.lag_samples).abs() < 1e-9);
        assert_eq!(run.aligned.len(), data.time().len());
        assert!(run.aligned.is_complete());
    }

    #[test]
    fn zero_filled_gaps_only_blur_the_shift() {
        let run = run_shift(&sample(), REFERENCE, DELAYED, 10, 2.0).unwrap();
        assert!((run.lag_samples - 3.4).abs() < 1.0, "{}", run.lag_samples);
    }

    #[test]
    fn decay_fits_the_boiler() {
        let data = sample();
        let (t0, t1) = data.time().span().unwrap();
        let run = run_decay(&data, BOILER, (t0, t1)).unwrap();
        assert!((run.fit.half_life - 7200.0).abs() / 7200.0 < 0.1, "{}", run.fit.half_life);
        assert_eq!(run.curve.len(), DEFAULT_CURVE_STEPS);
    }

    #[test]
    fn derive_uses_standardized_units() {
        let data = sample();
        let run = run_derive(&data, "LOAD - PV", Some("GRID")).unwrap();
        assert_eq!(run.series.name, "GRID");
        assert_eq!(run.series.unit, "W");
        assert!(run.series.is_complete());

        let load = data.get(LOAD).unwrap().get(0).unwrap();
        let pv = crate::signal::fix(data.get(PV).unwrap()).get(0).unwrap();
        assert!((run.series.get(0).unwrap() - (load - pv)).abs() < 1e-9);
    }

    #[test]
    fn derive_reports_unknown_operands() {
        let err = run_derive(&sample(), "LOAD - NOPE", None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn unknown_series_is_an_input_error() {
        let data = sample();
        assert_eq!(run_shift(&data, "X", DELAYED, 5, 1.0).unwrap_err().exit_code(), 2);
        assert_eq!(run_energy(&data, "X", None).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn energy_over_the_whole_sample() {
        let data = sample();
        let run = run_energy(&data, LOAD, None).unwrap();
        // Base load of 300 W over 12 hours plus the pulses.
        assert!(run.kwh > 3.6, "{}", run.kwh);
        assert_eq!(run.unit, "W");
    }
}
