//! Time-shift estimation between two aligned series, and fractional shifting.
//!
//! `assess_shift` cross-correlates a reference and a signal, then localizes
//! the correlation peak to sub-sample precision with [`PeakedSignal`]. A
//! positive lag means the signal trails the reference.

use serde::{Deserialize, Serialize};

use crate::domain::Series;
use crate::error::SignalError;
use crate::signal::gapfill;
use crate::signal::peak::PeakedSignal;
use crate::signal::xcorr::{CrossCorrelation, cross_correlate};

/// Result of [`assess_shift`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftEstimate {
    /// Estimated lag in samples (fractional).
    pub lag_samples: f64,
    /// Correlation interpolated at the estimated lag, when inside the window.
    pub peak_correlation: Option<f64>,
    /// The full correlation the estimate was derived from.
    pub correlation: CrossCorrelation,
}

impl ShiftEstimate {
    /// Lag converted to seconds for a given sampling time.
    pub fn seconds(&self, sampling_time: f64) -> f64 {
        self.lag_samples * sampling_time
    }
}

/// Estimate how far `signal` trails `reference`.
///
/// `kernel_radius` bounds the lag window (samples); `search_radius` bounds
/// the sub-sample search around the largest correlation (lag units).
pub fn assess_shift(
    reference: &Series,
    signal: &Series,
    kernel_radius: usize,
    search_radius: f64,
) -> Result<ShiftEstimate, SignalError> {
    let correlation = cross_correlate(reference, signal, kernel_radius)?;
    let peaked = PeakedSignal::new(correlation.to_lag_map());
    let lag_samples = peaked.find_peak(search_radius, None)?;
    let peak_correlation = peaked.value(lag_samples);

    log::info!(
        "'{}' trails '{}' by {lag_samples:.3} samples",
        signal.name,
        reference.name
    );

    Ok(ShiftEstimate {
        lag_samples,
        peak_correlation,
        correlation,
    })
}

/// Resample `values` at `i + shift` by linear interpolation.
///
/// Positions before the start repeat the first value; positions at or past
/// the last interpolable pair repeat the last value.
pub fn apply_shift(values: &[f64], shift: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 || !shift.is_finite() {
        return values.to_vec();
    }
    let whole = shift.floor();
    let frac = shift - whole;
    let last = n as i64 - 1;
    // Anything beyond the array already resolves to an end value.
    let whole = (whole as i64).clamp(-(n as i64), n as i64);

    (0..n as i64)
        .map(|i| {
            let j = i + whole;
            if j < 0 {
                values[0]
            } else if j > last - 1 {
                values[n - 1]
            } else {
                let j = j as usize;
                (1.0 - frac) * values[j] + frac * values[j + 1]
            }
        })
        .collect()
}

/// Gap-fill and shift a series; name and unit are kept.
pub fn shift_series(series: &Series, shift: f64) -> Series {
    let filled = gapfill::fix_values(&series.samples);
    Series::new(
        series.name.clone(),
        series.unit.clone(),
        apply_shift(&filled, shift).into_iter().map(Some).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(len: usize, center: f64) -> Series {
        let values: Vec<f64> = (0..len)
            .map(|i| (-((i as f64 - center) / 3.0).powi(2)).exp())
            .collect();
        Series::from_values(format!("pulse@{center}"), "W", &values)
    }

    #[test]
    fn recovers_integer_and_fractional_delays() {
        let reference = pulse(80, 30.0);
        for delay in [3.0, 2.5, -1.3] {
            let signal = pulse(80, 30.0 + delay);
            let est = assess_shift(&reference, &signal, 8, 2.0).unwrap();
            assert!(
                (est.lag_samples - delay).abs() < 0.05,
                "delay {delay}: estimated {}",
                est.lag_samples
            );
            assert!(est.peak_correlation.unwrap() > 0.95);
        }
    }

    #[test]
    fn seconds_scale_with_sampling_time() {
        let reference = pulse(60, 20.0);
        let est = assess_shift(&reference, &pulse(60, 22.0), 5, 1.5).unwrap();
        assert!((est.seconds(60.0) - 120.0).abs() < 3.0);
    }

    #[test]
    fn integer_shift_moves_indices_with_clamping() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(
            apply_shift(&x, 2.0),
            vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 9.0, 9.0]
        );
        assert_eq!(
            apply_shift(&x, -2.0),
            vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn fractional_shift_interpolates() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let up = apply_shift(&x, 0.25);
        assert!((up[0] - 0.25).abs() < 1e-12);
        assert!((up[7] - 7.25).abs() < 1e-12);
        assert_eq!(up[9], 9.0);

        let down = apply_shift(&x, -0.25);
        assert_eq!(down[0], 0.0);
        assert!((down[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn shifting_realigns_a_delayed_series() {
        let reference = pulse(50, 20.0);
        let delayed = pulse(50, 23.0);
        let aligned = shift_series(&delayed, 3.0);
        for i in 5..40 {
            assert!((aligned.get(i).unwrap() - reference.get(i).unwrap()).abs() < 1e-12);
        }
        assert_eq!(aligned.unit, "W");
    }

    #[test]
    fn huge_shifts_clamp_to_the_ends() {
        let x = [1.0, 2.0, 3.0];
        assert_eq!(apply_shift(&x, 1e19), vec![3.0, 3.0, 3.0]);
        assert_eq!(apply_shift(&x, -1e19), vec![1.0, 1.0, 1.0]);
        assert_eq!(apply_shift(&x, f64::MAX), vec![3.0, 3.0, 3.0]);
        assert_eq!(apply_shift(&x, 3.5), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn empty_input_passes_through() {
        assert!(apply_shift(&[], 1.5).is_empty());
    }
}
