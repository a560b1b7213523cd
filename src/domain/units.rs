//! Unit standardization for power and energy series.
//!
//! Telemetry arrives in whatever unit the meter reports (`W`, `kW`, `Wh`,
//! `kWh`). Within a unit family every label has a scale factor relative to the
//! family's base unit; a series is converted when its unit is known but not
//! one of the preferred units.

use crate::domain::{DataSet, Series};

/// Unit families and their scale factors relative to the family base.
const UNIT_FAMILIES: &[&[(&str, f64)]] = &[
    &[("W", 1.0), ("kW", 1000.0)],
    &[("Wh", 1.0), ("kWh", 1000.0)],
];

fn family_of(unit: &str) -> Option<&'static [(&'static str, f64)]> {
    UNIT_FAMILIES
        .iter()
        .copied()
        .find(|family| family.iter().any(|(u, _)| *u == unit))
}

fn factor(family: &[(&str, f64)], unit: &str) -> Option<f64> {
    family.iter().find(|(u, _)| *u == unit).map(|(_, f)| *f)
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitStandardizer {
    preferred: Vec<String>,
}

impl Default for UnitStandardizer {
    fn default() -> Self {
        Self::new(["W", "Wh"])
    }
}

impl UnitStandardizer {
    pub fn new<I, S>(preferred: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred: preferred.into_iter().map(Into::into).collect(),
        }
    }

    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    pub fn is_known_unit(unit: &str) -> bool {
        family_of(unit).is_some()
    }

    /// True if `unit` is a known unit that is not preferred.
    pub fn must_convert(&self, unit: &str) -> bool {
        Self::is_known_unit(unit) && !self.preferred.iter().any(|p| p == unit)
    }

    /// Preferred unit and multiplicative factor for converting from `unit`.
    ///
    /// `None` if the unit is unknown or its family has no preferred unit.
    pub fn conversion(&self, unit: &str) -> Option<(&str, f64)> {
        let family = family_of(unit)?;
        let from = factor(family, unit)?;
        let target = self
            .preferred
            .iter()
            .find(|p| factor(family, p).is_some())?;
        let to = factor(family, target)?;
        Some((target.as_str(), from / to))
    }

    /// Convert a series to its preferred unit; missing cells stay missing.
    pub fn convert(&self, series: &Series) -> Series {
        if !self.must_convert(&series.unit) {
            return series.clone();
        }
        let Some((target, fac)) = self.conversion(&series.unit) else {
            return series.clone();
        };
        log::debug!(
            "converting '{}' from {} to {} (x{fac})",
            series.name,
            series.unit,
            target
        );
        Series {
            name: series.name.clone(),
            unit: target.to_string(),
            samples: series.samples.iter().map(|s| s.map(|v| v * fac)).collect(),
        }
    }

    /// Convert every series in the data set in place.
    pub fn standardize(&self, data: &mut DataSet) {
        for series in data.iter_mut() {
            if self.must_convert(&series.unit) {
                *series = self.convert(series);
            }
        }
    }
}
