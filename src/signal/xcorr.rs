//! Normalized cross-correlation over a bounded lag window.
//!
//! For lags `j ∈ [-k, k]`:
//!
//! ```text
//! cc(j) = Σ_i dA[i] · dB[i + j] / (σA · σB · N)
//! ```
//!
//! where `dA`/`dB` are the zero-filled, globally demeaned inputs and `σ` the
//! population standard deviations. Indices near the ends use the truncated
//! overlap (no wrapping, no padding).
//!
//! Positions without real data are left out of the sum: position `i` is
//! skipped when `A[i]` is missing *and* every `B` sample in `[i-k, i+k]` is
//! missing. "Missing" means an absent sample, never a `0.0` reading.
//!
//! Lags are independent and are computed in parallel; each lag still sums in
//! ascending `i` order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Series;
use crate::error::SignalError;
use crate::signal::gapfill::zero_fill;

/// Integer lag → correlation value.
pub type LagMap = BTreeMap<i64, f64>;

/// Output of [`cross_correlate`]: parallel lag and value arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCorrelation {
    pub lags: Vec<i64>,
    pub values: Vec<f64>,
}

impl CrossCorrelation {
    pub fn to_lag_map(&self) -> LagMap {
        self.lags.iter().copied().zip(self.values.iter().copied()).collect()
    }

    /// Value at `lag`, if inside the window.
    pub fn at(&self, lag: i64) -> Option<f64> {
        let first = *self.lags.first()?;
        let idx = usize::try_from(lag - first).ok()?;
        self.values.get(idx).copied()
    }

    /// Lag with the largest value (first one on ties).
    pub fn peak(&self) -> Option<(i64, f64)> {
        self.lags
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .fold(None, |best, (lag, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((lag, v)),
            })
    }
}

/// Cross-correlate two equally long series over lags `[-kernel_radius, kernel_radius]`.
///
/// # Errors
/// - `EmptyInput` if the series are empty
/// - `LengthMismatch` if their lengths differ
/// - `NumericDegeneracy` if either series has zero variance after zero filling
pub fn cross_correlate(
    a: &Series,
    b: &Series,
    kernel_radius: usize,
) -> Result<CrossCorrelation, SignalError> {
    correlate_samples(&a.samples, &b.samples, kernel_radius)
}

pub fn correlate_samples(
    a: &[Option<f64>],
    b: &[Option<f64>],
    kernel_radius: usize,
) -> Result<CrossCorrelation, SignalError> {
    if a.len() != b.len() {
        return Err(SignalError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(SignalError::EmptyInput);
    }
    let k = i64::try_from(kernel_radius)
        .map_err(|_| SignalError::malformed(format!("kernel radius {kernel_radius} is too large")))?;

    let n = a.len();
    let (da, std_a) = demean(&zero_fill(a));
    let (db, std_b) = demean(&zero_fill(b));
    let norm = std_a * std_b * n as f64;
    if !(norm.is_finite() && norm > 0.0) {
        return Err(SignalError::degenerate(
            "cross-correlation of a series with zero variance",
        ));
    }

    let has_data = data_mask(a, b, kernel_radius);

    let values: Vec<f64> = (0..=2 * kernel_radius)
        .into_par_iter()
        .map(|offset| {
            let lag = offset as i64 - k;
            let mut acc = 0.0;
            for i in 0..n {
                let j = i as i64 + lag;
                if j < 0 || j >= n as i64 || !has_data[i] {
                    continue;
                }
                acc += da[i] * db[j as usize];
            }
            acc / norm
        })
        .collect();

    log::debug!(
        "cross-correlated {n} samples over {} lags",
        values.len()
    );

    Ok(CrossCorrelation {
        lags: (-k..=k).collect(),
        values,
    })
}

/// Demeaned copy and population standard deviation.
fn demean(values: &[f64]) -> (Vec<f64>, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let demeaned: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let var = demeaned.iter().map(|v| v * v).sum::<f64>() / n;
    (demeaned, var.sqrt())
}

/// `true` where position `i` carries real data: `a[i]` is present or any
/// `b` sample in the window `[i-k, i+k]` is present.
fn data_mask(a: &[Option<f64>], b: &[Option<f64>], k: usize) -> Vec<bool> {
    let n = b.len();
    // present_before[m] = number of present `b` samples in `b[..m]`.
    let mut present_before = Vec::with_capacity(n + 1);
    present_before.push(0usize);
    for s in b {
        let last = present_before[present_before.len() - 1];
        present_before.push(last + usize::from(s.is_some()));
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(k);
            let hi = (i + k).min(n - 1);
            a[i].is_some() || present_before[hi + 1] > present_before[lo]
        })
        .collect()
}
