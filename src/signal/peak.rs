//! Sub-sample peak localization by symmetry.
//!
//! A well-formed correlation peak is locally symmetric. For a candidate axis
//! we mirror every sample left of the axis to the right, linearly interpolate
//! the map there and average the squared differences. The axis with the
//! smallest penalty, found by golden-section search around the largest
//! sample, is taken as the peak position.

use crate::error::SignalError;
use crate::math::golden_section_search;
use crate::signal::xcorr::LagMap;

/// Bracket width at which the axis search stops.
pub const PEAK_TOLERANCE: f64 = 1e-3;

/// A lag map viewed on a continuous axis, shifted horizontally by `delta`:
/// key `k` sits at `x = k + delta`.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakedSignal {
    map: LagMap,
    delta: f64,
}

impl PeakedSignal {
    pub fn new(map: LagMap) -> Self {
        Self::with_delta(map, 0.0)
    }

    pub fn with_delta(map: LagMap, delta: f64) -> Self {
        Self { map, delta }
    }

    pub fn map(&self) -> &LagMap {
        &self.map
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Integer key at or below `x` and the fractional remainder.
    fn bracket(&self, x: f64) -> Option<(i64, f64)> {
        let shifted = x - self.delta;
        if !shifted.is_finite() {
            return None;
        }
        let base = shifted.floor();
        Some((base as i64, shifted - base))
    }

    /// Linearly interpolated value at `x`; `None` if either bracketing key is absent.
    pub fn value(&self, x: f64) -> Option<f64> {
        let (base, rem) = self.bracket(x)?;
        let lo = self.map.get(&base)?;
        let hi = self.map.get(&(base + 1))?;
        Some((1.0 - rem) * lo + rem * hi)
    }

    /// `true` iff both keys bracketing `x` exist.
    pub fn in_range(&self, x: f64) -> bool {
        self.bracket(x)
            .is_some_and(|(base, _)| self.map.contains_key(&base) && self.map.contains_key(&(base + 1)))
    }

    /// `(x, mirror)` pairs around `axis` for every sample left of it whose
    /// mirror image can be interpolated.
    pub fn symmetric_pairs(&self, axis: f64) -> Vec<(f64, f64)> {
        self.map
            .keys()
            .map(|&k| k as f64 + self.delta)
            .filter(|&x| x < axis)
            .map(|x| (x, axis + (axis - x)))
            .filter(|&(_, mirror)| self.in_range(mirror))
            .collect()
    }

    /// Mean squared asymmetry around `axis`; `0.0` when there are no pairs.
    pub fn penalty(&self, axis: f64) -> f64 {
        let (sum, count) = self
            .symmetric_pairs(axis)
            .into_iter()
            .filter_map(|(x, mirror)| Some(self.value(x)? - self.value(mirror)?))
            .fold((0.0, 0usize), |(sum, count), d| (sum + d * d, count + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    /// Position (on the shifted axis) of the key with the largest value.
    pub fn argmax(&self) -> Option<f64> {
        self.map
            .iter()
            .fold(None, |best: Option<(i64, f64)>, (&k, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k, v)),
            })
            .map(|(k, _)| k as f64 + self.delta)
    }

    /// Axis of best symmetry within `search_radius` of `initial_estimate`
    /// (default: the largest sample).
    pub fn find_peak(&self, search_radius: f64, initial_estimate: Option<f64>) -> Result<f64, SignalError> {
        if !(search_radius.is_finite() && search_radius >= 0.0) {
            return Err(SignalError::malformed(format!(
                "search radius must be finite and non-negative, got {search_radius}"
            )));
        }
        let seed = match initial_estimate {
            Some(x) => x,
            None => self.argmax().ok_or(SignalError::EmptyInput)?,
        };

        let (lo, hi) = golden_section_search(
            |axis| self.penalty(axis),
            seed - search_radius,
            seed + search_radius,
            PEAK_TOLERANCE,
        );
        let peak = (lo + hi) / 2.0;
        log::debug!(
            "peak search around {seed:.3} ±{search_radius}: bracket [{lo:.4}, {hi:.4}] -> {peak:.4}"
        );
        Ok(peak)
    }
}
