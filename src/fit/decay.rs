//! Exponential-decay fit over a time window of a data set.
//!
//! Timestamps are shifted so the first usable sample sits at `x = 0`; this
//! keeps `e^(b·x)` well scaled when timestamps are epoch seconds.

use serde::{Deserialize, Serialize};

use crate::domain::DataSet;
use crate::error::SignalError;
use crate::fit::{FitOutcome, GaussNewton};
use crate::models::{CurveModel, ExpDecay, ExpDecayParams};

pub const DEFAULT_CURVE_STEPS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayFit {
    pub series: String,
    pub params: ExpDecayParams,
    /// Seconds for the decaying part to halve.
    pub half_life: f64,
    pub iterations: usize,
    pub converged: bool,
    pub rmse: f64,
    pub samples_used: usize,
    /// Absolute time that `x = 0` corresponds to.
    pub time_origin: f64,
    /// Last absolute time covered by the fit.
    pub time_end: f64,
}

impl DecayFit {
    /// Model value at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.params.value(t - self.time_origin)
    }

    /// `steps` evenly spaced `(t, y)` points over the fitted window.
    pub fn curve(&self, steps: usize) -> Vec<(f64, f64)> {
        let span = self.time_end - self.time_origin;
        match steps {
            0 => Vec::new(),
            1 => vec![(self.time_origin, self.value_at(self.time_origin))],
            _ => (0..steps)
                .map(|i| {
                    let t = self.time_origin + span * i as f64 / (steps - 1) as f64;
                    (t, self.value_at(t))
                })
                .collect(),
        }
    }
}

/// Fit `a·e^(b·(t - t_origin)) + c` to `name` over `[t0, t1]`.
pub fn fit_decay_window(data: &DataSet, name: &str, window: (f64, f64)) -> Result<DecayFit, SignalError> {
    fit_decay_window_with(&GaussNewton::default(), data, name, window)
}

pub fn fit_decay_window_with(
    solver: &GaussNewton,
    data: &DataSet,
    name: &str,
    (t0, t1): (f64, f64),
) -> Result<DecayFit, SignalError> {
    let (times, samples) = data
        .window(name, t0, t1)?
        .ok_or_else(|| SignalError::malformed(format!("no samples of '{name}' in [{t0}, {t1}]")))?;

    let (abs_times, ys): (Vec<f64>, Vec<f64>) = times
        .into_iter()
        .zip(samples)
        .filter_map(|(t, v)| v.map(|v| (t, v)))
        .unzip();
    let (Some(&origin), Some(&end)) = (abs_times.first(), abs_times.last()) else {
        return Err(SignalError::EmptyInput);
    };
    let xs: Vec<f64> = abs_times.iter().map(|t| t - origin).collect();

    let FitOutcome {
        params,
        iterations,
        converged,
        rmse,
        ..
    } = solver.solve(&ExpDecay, &xs, &ys)?;
    if !converged {
        log::warn!(
            "{name}: {} did not converge within {iterations} iterations",
            ExpDecay.name()
        );
    }
    let params = ExpDecayParams::from_slice(&params)
        .ok_or_else(|| SignalError::degenerate("unexpected parameter count"))?;

    log::info!(
        "{name}: fitted a={:.4} b={:.6e} c={:.4} over {} samples",
        params.amplitude,
        params.rate,
        params.offset,
        ys.len()
    );

    Ok(DecayFit {
        series: name.to_string(),
        half_life: params.half_life(),
        params,
        iterations,
        converged,
        rmse,
        samples_used: ys.len(),
        time_origin: origin,
        time_end: end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, TimeBase};

    const HALF_LIFE: f64 = 7200.0;

    /// Two-hour half-life cooling curve sampled every five minutes from an epoch offset.
    fn cooling(gaps: &[usize]) -> DataSet {
        let start = 1_700_000_000.0;
        let stamps: Vec<f64> = (0..97).map(|i| start + 300.0 * f64::from(i)).collect();
        let rate = -std::f64::consts::LN_2 / HALF_LIFE;
        let samples = (0..97)
            .map(|i| {
                if gaps.contains(&i) {
                    None
                } else {
                    Some(2000.0 * (rate * 300.0 * i as f64).exp() + 150.0)
                }
            })
            .collect();
        let mut data = DataSet::new("boiler", TimeBase::new(stamps).unwrap());
        data.insert(Series::new("TEMP", "W", samples)).unwrap();
        data
    }

    #[test]
    fn recovers_half_life_from_epoch_timestamps() {
        let data = cooling(&[]);
        let (t0, t1) = data.time().span().unwrap();
        let fit = fit_decay_window(&data, "TEMP", (t0, t1)).unwrap();

        assert!(fit.converged);
        assert_eq!(fit.samples_used, 97);
        assert_eq!(fit.time_origin, t0);
        assert!((fit.half_life - HALF_LIFE).abs() < 1e-3);
        assert!((fit.params.amplitude - 2000.0).abs() < 1e-4);
        assert!((fit.params.offset - 150.0).abs() < 1e-4);
    }

    #[test]
    fn missing_samples_are_skipped() {
        let data = cooling(&[0, 5, 6, 40]);
        let (t0, t1) = data.time().span().unwrap();
        let fit = fit_decay_window(&data, "TEMP", (t0, t1)).unwrap();
        assert_eq!(fit.samples_used, 93);
        assert_eq!(fit.time_origin, t0 + 300.0);
        assert!((fit.half_life - HALF_LIFE).abs() < 1e-3);
    }

    #[test]
    fn curve_spans_the_window() {
        let data = cooling(&[]);
        let (t0, t1) = data.time().span().unwrap();
        let fit = fit_decay_window(&data, "TEMP", (t0, t1)).unwrap();
        let curve = fit.curve(DEFAULT_CURVE_STEPS);
        assert_eq!(curve.len(), DEFAULT_CURVE_STEPS);
        assert_eq!(curve[0].0, t0);
        assert!((curve[DEFAULT_CURVE_STEPS - 1].0 - t1).abs() < 1e-6);
        assert!((curve[0].1 - 2150.0).abs() < 1e-3);
        assert!(curve.windows(2).all(|w| w[1].1 < w[0].1));
        assert!(fit.curve(0).is_empty());
    }

    #[test]
    fn unknown_series_or_empty_window_is_an_error() {
        let data = cooling(&[]);
        assert!(matches!(
            fit_decay_window(&data, "NOPE", (0.0, 1.0)),
            Err(SignalError::MalformedInput(_))
        ));

        let stamps = TimeBase::new(vec![0.0, 1.0, 2.0]).unwrap();
        let mut blank = DataSet::new("blank", stamps);
        blank.insert(Series::new("X", "W", vec![None; 3])).unwrap();
        assert_eq!(fit_decay_window(&blank, "X", (0.0, 2.0)), Err(SignalError::EmptyInput));
    }
}
