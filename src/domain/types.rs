//! Shared domain types.
//!
//! This module defines:
//!
//! - `Series`: a named, unit-labelled run of samples where `None` marks a missing cell
//! - `TimeBase`: the strictly increasing timestamps every series in a data set is aligned to
//! - `DataSet`: a time base plus the named series sampled on it
//! - `SeriesSource`: the lookup seam used by the formula evaluator

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::math::interval_to_range;

/// A named series of samples.
///
/// Sample order is time order. A missing reading is `None`; `Some(0.0)` is a
/// real zero reading and is never treated as missing by the algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub unit: String,
    pub samples: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, samples: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            samples,
        }
    }

    /// Build a fully populated series.
    pub fn from_values(name: impl Into<String>, unit: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, unit, values.iter().copied().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`; `None` when missing or out of bounds.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied().flatten()
    }

    pub fn missing_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.samples.iter().all(Option::is_some)
    }

    /// Smallest and largest present sample.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.samples.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// The same samples under a different name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Strictly increasing timestamps in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct TimeBase(Vec<f64>);

impl TryFrom<Vec<f64>> for TimeBase {
    type Error = SignalError;

    fn try_from(stamps: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(stamps)
    }
}

impl TimeBase {
    pub fn new(stamps: Vec<f64>) -> Result<Self, SignalError> {
        if let Some(bad) = stamps.iter().position(|t| !t.is_finite()) {
            return Err(SignalError::malformed(format!(
                "timestamp #{bad} is not a finite number"
            )));
        }
        if let Some(i) = stamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SignalError::malformed(format!(
                "timestamps must be strictly increasing (#{} = {} followed by {})",
                i,
                stamps[i],
                stamps[i + 1]
            )));
        }
        Ok(Self(stamps))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First and last timestamp.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.0.first()?, *self.0.last()?))
    }

    /// Mean spacing between consecutive timestamps.
    pub fn sampling_time(&self) -> Option<f64> {
        if self.0.len() < 2 {
            return None;
        }
        let total: f64 = self.0.windows(2).map(|w| w[1] - w[0]).sum();
        Some(total / (self.0.len() - 1) as f64)
    }

    /// Inclusive index range covering `[t0, t1]`.
    pub fn index_range(&self, t0: f64, t1: f64) -> Result<Option<RangeInclusive<usize>>, SignalError> {
        interval_to_range(&self.0, t0, t1)
    }
}

/// Anything that can hand out a series by name.
pub trait SeriesSource {
    fn series(&self, name: &str) -> Option<&Series>;
}

impl SeriesSource for HashMap<String, Series> {
    fn series(&self, name: &str) -> Option<&Series> {
        self.get(name)
    }
}

impl SeriesSource for BTreeMap<String, Series> {
    fn series(&self, name: &str) -> Option<&Series> {
        self.get(name)
    }
}

/// Named series sharing one time base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataSetFields")]
pub struct DataSet {
    pub name: String,
    time: TimeBase,
    series: BTreeMap<String, Series>,
}

/// Unchecked wire form of a [`DataSet`].
#[derive(Deserialize)]
struct DataSetFields {
    name: String,
    time: TimeBase,
    series: BTreeMap<String, Series>,
}

impl TryFrom<DataSetFields> for DataSet {
    type Error = SignalError;

    fn try_from(fields: DataSetFields) -> Result<Self, Self::Error> {
        let mut data = DataSet::new(fields.name, fields.time);
        for (key, series) in fields.series {
            if key != series.name {
                return Err(SignalError::malformed(format!(
                    "series stored under '{key}' is named '{}'",
                    series.name
                )));
            }
            data.insert(series)?;
        }
        Ok(data)
    }
}

impl DataSet {
    pub fn new(name: impl Into<String>, time: TimeBase) -> Self {
        Self {
            name: name.into(),
            time,
            series: BTreeMap::new(),
        }
    }

    /// Add (or replace) a series. Its length must match the time base.
    pub fn insert(&mut self, series: Series) -> Result<(), SignalError> {
        if series.len() != self.time.len() {
            return Err(SignalError::malformed(format!(
                "series '{}' has {} samples but the time base has {}",
                series.name,
                series.len(),
                self.time.len()
            )));
        }
        self.series.insert(series.name.clone(), series);
        Ok(())
    }

    pub fn time(&self) -> &TimeBase {
        &self.time
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    /// Callers must keep each series' name and length.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Series> {
        self.series.values_mut()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn sampling_time(&self) -> Option<f64> {
        self.time.sampling_time()
    }

    /// Series grouped by unit label, in name order within each group.
    pub fn grouped_by_unit(&self) -> BTreeMap<&str, Vec<&Series>> {
        let mut groups: BTreeMap<&str, Vec<&Series>> = BTreeMap::new();
        for s in self.series.values() {
            groups.entry(s.unit.as_str()).or_default().push(s);
        }
        groups
    }

    /// Timestamps and samples of `name` restricted to `[t0, t1]`.
    ///
    /// Returns `Ok(None)` when the series is unknown or the window selects nothing.
    pub fn window(
        &self,
        name: &str,
        t0: f64,
        t1: f64,
    ) -> Result<Option<(Vec<f64>, Vec<Option<f64>>)>, SignalError> {
        let Some(series) = self.series.get(name) else {
            return Ok(None);
        };
        let Some(range) = self.time.index_range(t0, t1)? else {
            return Ok(None);
        };
        let times = self.time.as_slice()[range.clone()].to_vec();
        let samples = series.samples[range].to_vec();
        Ok(Some((times, samples)))
    }
}

impl SeriesSource for DataSet {
    fn series(&self, name: &str) -> Option<&Series> {
        self.get(name)
    }
}
