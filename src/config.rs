//! Runtime defaults read from the environment (and an optional `.env` file).
//!
//! | variable               | meaning                                   | default  |
//! |------------------------|-------------------------------------------|----------|
//! | `PSIG_KERNEL_RADIUS`   | max lag (samples) of the cross-correlation | `10`     |
//! | `PSIG_SEARCH_RADIUS`   | peak search half-width (samples)          | `2.0`    |
//! | `PSIG_PREFERRED_UNITS` | space separated unit labels               | `W Wh`   |
//!
//! Command-line flags override whatever is loaded here.

use std::str::FromStr;

use serde::Serialize;

use crate::domain::UnitStandardizer;
use crate::error::AppError;

pub const DEFAULT_KERNEL_RADIUS: usize = 10;
pub const DEFAULT_SEARCH_RADIUS: f64 = 2.0;
pub const DEFAULT_PREFERRED_UNITS: &str = "W Wh";

pub const KERNEL_RADIUS_VAR: &str = "PSIG_KERNEL_RADIUS";
pub const SEARCH_RADIUS_VAR: &str = "PSIG_SEARCH_RADIUS";
pub const PREFERRED_UNITS_VAR: &str = "PSIG_PREFERRED_UNITS";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub kernel_radius: usize,
    pub search_radius: f64,
    pub preferred_units: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kernel_radius: DEFAULT_KERNEL_RADIUS,
            search_radius: DEFAULT_SEARCH_RADIUS,
            preferred_units: split_units(DEFAULT_PREFERRED_UNITS),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = read(KERNEL_RADIUS_VAR) {
            settings.kernel_radius = parse_var(KERNEL_RADIUS_VAR, &raw)?;
        }
        if let Some(raw) = read(SEARCH_RADIUS_VAR) {
            let radius: f64 = parse_var(SEARCH_RADIUS_VAR, &raw)?;
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(AppError::new(
                    2,
                    format!("{SEARCH_RADIUS_VAR} must be a non-negative number, got '{raw}'"),
                ));
            }
            settings.search_radius = radius;
        }
        if let Some(raw) = read(PREFERRED_UNITS_VAR) {
            settings.preferred_units = split_units(&raw);
        }

        log::debug!("settings: {settings:?}");
        Ok(settings)
    }

    pub fn standardizer(&self) -> UnitStandardizer {
        UnitStandardizer::new(self.preferred_units.iter().cloned())
    }
}

fn split_units(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::new(2, format!("invalid value for {key}: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.preferred_units, vec!["W", "Wh"]);
    }

    #[test]
    fn variables_override_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            (KERNEL_RADIUS_VAR, "25"),
            (SEARCH_RADIUS_VAR, " 3.5 "),
            (PREFERRED_UNITS_VAR, "kW  kWh"),
        ]))
        .unwrap();
        assert_eq!(settings.kernel_radius, 25);
        assert_eq!(settings.search_radius, 3.5);
        assert_eq!(settings.preferred_units, vec!["kW", "kWh"]);
        assert!(settings.standardizer().must_convert("W"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[(KERNEL_RADIUS_VAR, "  ")])).unwrap();
        assert_eq!(settings.kernel_radius, DEFAULT_KERNEL_RADIUS);
    }

    #[test]
    fn bad_values_are_input_errors() {
        let err = Settings::from_lookup(lookup(&[(KERNEL_RADIUS_VAR, "-3")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = Settings::from_lookup(lookup(&[(SEARCH_RADIUS_VAR, "-1")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
