//! Energy totals from power series.

use crate::domain::DataSet;
use crate::error::SignalError;
use crate::math::{Rounding, search};
use crate::signal::gapfill;

/// Seconds per hour times watts per kilowatt: converts `W · s` to `kWh`.
const WATT_SECONDS_PER_KWH: f64 = 3600.0 * 1000.0;

/// Total energy (kWh) of the power series `name` (in W).
///
/// The series is gap-filled, restricted to the half-open index range between
/// the samples nearest to `window.0` and `window.1` (or taken whole), summed
/// and scaled by the mean sampling time.
///
/// Returns `Ok(None)` if the series is unknown or the time base is too short
/// to have a sampling time.
pub fn total_energy(
    data: &DataSet,
    name: &str,
    window: Option<(f64, f64)>,
) -> Result<Option<f64>, SignalError> {
    let Some(series) = data.get(name) else {
        return Ok(None);
    };
    let Some(sampling_time) = data.sampling_time() else {
        return Ok(None);
    };
    let filled = gapfill::fix(series);
    let values: Vec<f64> = filled.samples.iter().flatten().copied().collect();

    let slice = match window {
        Some((t0, t1)) => {
            let stamps = data.time().as_slice();
            let start = search(stamps, t0, Rounding::Nearest)?;
            let end = search(stamps, t1, Rounding::Nearest)?;
            if end <= start {
                &values[0..0]
            } else {
                &values[start..end]
            }
        }
        None => &values[..],
    };

    Ok(Some(slice.iter().sum::<f64>() * sampling_time / WATT_SECONDS_PER_KWH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, TimeBase};

    fn constant_load(watts: f64, samples: usize, step: f64) -> DataSet {
        let time = TimeBase::new((0..samples).map(|i| i as f64 * step).collect()).unwrap();
        let mut data = DataSet::new("load", time);
        data.insert(Series::from_values("P", "W", &vec![watts; samples]))
            .unwrap();
        data
    }

    #[test]
    fn one_kilowatt_for_an_hour_is_one_kwh() {
        let data = constant_load(1000.0, 60, 60.0);
        let kwh = total_energy(&data, "P", None).unwrap().unwrap();
        assert!((kwh - 1.0).abs() < 1e-12);
    }

    #[test]
    fn window_is_half_open_on_nearest_samples() {
        let data = constant_load(3600.0, 11, 1000.0);
        // Samples 2..5 (three samples of 1000 s at 3.6 kW) = 3 kWh.
        let kwh = total_energy(&data, "P", Some((2100.0, 4900.0))).unwrap().unwrap();
        assert!((kwh - 3.0).abs() < 1e-12, "{kwh}");

        let none = total_energy(&data, "P", Some((5000.0, 1000.0))).unwrap().unwrap();
        assert_eq!(none, 0.0);
    }

    #[test]
    fn gaps_are_filled_before_summing() {
        let time = TimeBase::new(vec![0.0, 3600.0, 7200.0]).unwrap();
        let mut data = DataSet::new("d", time);
        data.insert(Series::new("P", "W", vec![Some(1000.0), None, Some(3000.0)]))
            .unwrap();
        let kwh = total_energy(&data, "P", None).unwrap().unwrap();
        // Middle sample becomes 2000 W: 6000 W over 1 h per sample.
        assert!((kwh - 6.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_series_has_no_energy() {
        let data = constant_load(1.0, 3, 1.0);
        assert_eq!(total_energy(&data, "nope", None).unwrap(), None);
    }
}
