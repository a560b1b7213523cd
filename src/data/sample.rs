//! Synthetic telemetry for demos and tests.
//!
//! One data set on a regular time base with:
//!
//! - `REFERENCE` (W): a train of well separated Gaussian load pulses
//! - `DELAYED` (W): the same pulses arriving `delay` samples later, with noise
//!   and dropped samples
//! - `LOAD` (kW): the reference pulses on top of a base load
//! - `PV` (W): a daylight bell curve with noise and dropped samples
//! - `BOILER` (W): a noisy exponential cool-down towards a standing loss

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DataSet, Series, TimeBase};
use crate::error::AppError;

pub const REFERENCE: &str = "REFERENCE";
pub const DELAYED: &str = "DELAYED";
pub const LOAD: &str = "LOAD";
pub const PV: &str = "PV";
pub const BOILER: &str = "BOILER";

/// 2024-03-01T00:00:00Z
const DEFAULT_START: f64 = 1_709_251_200.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub samples: usize,
    /// Seconds between samples.
    pub sampling_time: f64,
    pub start: f64,
    /// Delay of `DELAYED` behind `REFERENCE`, in samples.
    pub delay: f64,
    pub pulses: usize,
    /// Noise standard deviation as a fraction of the pulse amplitude.
    pub noise: f64,
    /// Probability that a sample of `DELAYED` / `PV` is dropped.
    pub gap_probability: f64,
    /// Half-life of the `BOILER` decay, in seconds.
    pub half_life: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples: 144,
            sampling_time: 300.0,
            start: DEFAULT_START,
            delay: 3.4,
            pulses: 4,
            noise: 0.02,
            gap_probability: 0.05,
            half_life: 7200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub data: DataSet,
    pub config: SampleConfig,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    center: f64,
    width: f64,
    amplitude: f64,
}

fn pulse_train(pulses: &[Pulse], x: f64) -> f64 {
    pulses
        .iter()
        .map(|p| p.amplitude * (-((x - p.center) / p.width).powi(2)).exp())
        .sum()
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.samples < 8 {
        return Err(AppError::new(2, "Sample count must be at least 8."));
    }
    if !(config.sampling_time.is_finite() && config.sampling_time > 0.0) {
        return Err(AppError::new(2, "Sampling time must be > 0."));
    }
    if !(0.0..1.0).contains(&config.gap_probability) {
        return Err(AppError::new(2, "Gap probability must be in [0, 1)."));
    }
    if !(config.half_life.is_finite() && config.half_life > 0.0) {
        return Err(AppError::new(2, "Half-life must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise.max(0.0))
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let n = config.samples;
    let spacing = n as f64 / (config.pulses + 1) as f64;
    let jitter = (spacing / 10.0).min(3.0);
    let pulses: Vec<Pulse> = (1..=config.pulses)
        .map(|k| Pulse {
            center: k as f64 * spacing + rng.gen_range(-jitter..=jitter),
            width: rng.gen_range(3.0..=6.0),
            amplitude: rng.gen_range(500.0..=2000.0),
        })
        .collect();
    let scale = pulses.iter().map(|p| p.amplitude).fold(0.0, f64::max);

    let stamps = (0..n)
        .map(|i| config.start + i as f64 * config.sampling_time)
        .collect();
    let mut data = DataSet::new("sample", TimeBase::new(stamps)?);

    let dropped = |rng: &mut StdRng| config.gap_probability > 0.0 && rng.gen_bool(config.gap_probability);

    let reference: Vec<f64> = (0..n).map(|i| pulse_train(&pulses, i as f64)).collect();

    let delayed = (0..n)
        .map(|i| {
            let value = pulse_train(&pulses, i as f64 - config.delay) + scale * noise.sample(&mut rng);
            (!dropped(&mut rng)).then_some(value)
        })
        .collect();

    let load: Vec<f64> = reference.iter().map(|w| 0.3 + w / 1000.0).collect();

    let midday = n as f64 / 2.0;
    let daylight = n as f64 / 6.0;
    let pv = (0..n)
        .map(|i| {
            let bell = 3000.0 * (-((i as f64 - midday) / daylight).powi(2)).exp();
            let value = (bell + 3000.0 * noise.sample(&mut rng)).max(0.0);
            (!dropped(&mut rng)).then_some(value)
        })
        .collect();

    let rate = -std::f64::consts::LN_2 / config.half_life;
    let boiler: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * config.sampling_time;
            2000.0 * (rate * t).exp() + 150.0 + 100.0 * noise.sample(&mut rng)
        })
        .collect();

    data.insert(Series::from_values(REFERENCE, "W", &reference))?;
    data.insert(Series::new(DELAYED, "W", delayed))?;
    data.insert(Series::from_values(LOAD, "kW", &load))?;
    data.insert(Series::new(PV, "W", pv))?;
    data.insert(Series::from_values(BOILER, "W", &boiler))?;

    log::debug!(
        "generated {} samples of {} series (seed {})",
        n,
        data.len(),
        config.seed
    );

    Ok(SampleData {
        data,
        config: config.clone(),
    })
}
