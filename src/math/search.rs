//! Index lookup over ascending sample arrays (typically timestamps).
//!
//! `search` bisects `[lo, hi]` until the bracket is at most one index wide and
//! then resolves the bracket according to a [`Rounding`] mode. Values outside
//! the array's range clamp to the first/last index.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// How a value that falls between two samples resolves to an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// The numerically closer neighbour; an exact tie goes to the lower index.
    Nearest,
    /// The upper neighbour (first sample `>= value`).
    RoundUp,
    /// The lower neighbour (last sample `<= value`).
    RoundDown,
}

/// Index in `array` for `value` under `rounding`.
///
/// # Errors
/// - `EmptyInput` for an empty array
/// - `MalformedInput` if the array is not ascending
pub fn search(array: &[f64], value: f64, rounding: Rounding) -> Result<usize, SignalError> {
    if array.is_empty() {
        return Err(SignalError::EmptyInput);
    }
    if let Some(i) = array.windows(2).position(|w| !(w[0] <= w[1])) {
        return Err(SignalError::malformed(format!(
            "lookup array is not ascending at index {i}"
        )));
    }

    let last = array.len() - 1;
    if last == 0 || value <= array[0] {
        return Ok(0);
    }
    if value >= array[last] {
        return Ok(last);
    }

    let mut lo = 0usize;
    let mut hi = last;
    while hi - lo > 1 {
        let m = lo + (hi - lo) / 2;
        if array[m] < value {
            lo = m;
        } else if array[m] > value {
            hi = m;
        } else {
            return Ok(m);
        }
    }

    // `array[lo] < value < array[hi]` holds here.
    Ok(match rounding {
        Rounding::Nearest => {
            if array[hi] - value < value - array[lo] {
                hi
            } else {
                lo
            }
        }
        Rounding::RoundUp => hi,
        Rounding::RoundDown => lo,
    })
}

/// Inclusive index range covering the numeric interval `[low, high]`.
///
/// The lower bound rounds down and the upper bound rounds up, so every sample
/// inside the interval is covered. Returns `Ok(None)` if the interval is
/// inverted.
pub fn interval_to_range(
    array: &[f64],
    low: f64,
    high: f64,
) -> Result<Option<RangeInclusive<usize>>, SignalError> {
    let start = search(array, low, Rounding::RoundDown)?;
    let end = search(array, high, Rounding::RoundUp)?;
    if start > end || low > high {
        return Ok(None);
    }
    Ok(Some(start..=end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARRAY: [f64; 7] = [1.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

    #[test]
    fn exact_hits_return_their_index() {
        for (i, &v) in ARRAY.iter().enumerate() {
            for r in [Rounding::Nearest, Rounding::RoundUp, Rounding::RoundDown] {
                assert_eq!(search(&ARRAY, v, r).unwrap(), i);
            }
        }
    }

    #[test]
    fn between_samples_follows_rounding() {
        assert_eq!(search(&ARRAY, 4.2, Rounding::Nearest).unwrap(), 2);
        assert_eq!(search(&ARRAY, 4.8, Rounding::Nearest).unwrap(), 3);
        assert_eq!(search(&ARRAY, 4.2, Rounding::RoundUp).unwrap(), 3);
        assert_eq!(search(&ARRAY, 4.8, Rounding::RoundDown).unwrap(), 2);
    }

    #[test]
    fn nearest_tie_goes_to_lower_index() {
        assert_eq!(search(&ARRAY, 2.0, Rounding::Nearest).unwrap(), 0);
        assert_eq!(search(&ARRAY, 4.5, Rounding::Nearest).unwrap(), 2);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(search(&ARRAY, 0.0, Rounding::RoundUp).unwrap(), 0);
        assert_eq!(search(&ARRAY, 0.0, Rounding::Nearest).unwrap(), 0);
        assert_eq!(search(&ARRAY, 9.0, Rounding::RoundDown).unwrap(), 6);
        assert_eq!(search(&ARRAY, 9.0, Rounding::Nearest).unwrap(), 6);
    }

    #[test]
    fn single_element_and_empty() {
        assert_eq!(search(&[2.5], 100.0, Rounding::RoundUp).unwrap(), 0);
        assert_eq!(search(&[], 1.0, Rounding::Nearest), Err(SignalError::EmptyInput));
    }

    #[test]
    fn descending_input_is_rejected() {
        let desc = [8.0, 7.0, 6.0, 5.0];
        assert!(matches!(
            search(&desc, 0.0, Rounding::Nearest),
            Err(SignalError::MalformedInput(_))
        ));
    }

    #[test]
    fn interval_covers_inner_samples() {
        assert_eq!(interval_to_range(&ARRAY, 3.5, 6.5).unwrap(), Some(1..=5));
        assert_eq!(interval_to_range(&ARRAY, 4.0, 5.0).unwrap(), Some(2..=3));
        assert_eq!(interval_to_range(&ARRAY, 6.0, 4.0).unwrap(), None);
        assert!(interval_to_range(&[], 0.0, 1.0).is_err());
    }

    fn ascending() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.01f64..10.0, 1..40).prop_map(|steps| {
            let mut acc = 0.0;
            steps
                .into_iter()
                .map(|s| {
                    acc += s;
                    acc
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn nearest_minimizes_distance(array in ascending(), u in 0.0f64..1.0) {
            let (first, last) = (array[0], array[array.len() - 1]);
            let v = first + u * (last - first);
            let i = search(&array, v, Rounding::Nearest).unwrap();
            let best = array.iter().map(|a| (a - v).abs()).fold(f64::INFINITY, f64::min);
            prop_assert!(((array[i] - v).abs() - best).abs() < 1e-12);
        }

        #[test]
        fn directed_rounding_is_tight(array in ascending(), u in 0.0f64..1.0) {
            let (first, last) = (array[0], array[array.len() - 1]);
            let v = first + u * (last - first);
            let up = search(&array, v, Rounding::RoundUp).unwrap();
            let down = search(&array, v, Rounding::RoundDown).unwrap();
            prop_assert!(array[up] >= v);
            prop_assert!(array[down] <= v);
            prop_assert!(up == 0 || array[up - 1] < v);
            prop_assert!(down == array.len() - 1 || array[down + 1] > v);
        }

        #[test]
        fn interval_range_covers_every_inside_value(array in ascending(), a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (first, last) = (array[0], array[array.len() - 1]);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = (first + lo * (last - first)).clamp(first, last);
            let high = (first + hi * (last - first)).clamp(first, last);
            let range = interval_to_range(&array, low, high).unwrap().unwrap();
            for (i, &x) in array.iter().enumerate() {
                if x >= low && x <= high {
                    prop_assert!(range.contains(&i));
                }
            }
            let (start, end) = (*range.start(), *range.end());
            let n = array.len();
            // Minimal: one bracketing sample at most on each side.
            prop_assert!(array[start] <= low);
            prop_assert!(start == n - 1 || array[start + 1] > low);
            prop_assert!(start == 0 || array[start - 1] < low);
            prop_assert!(array[end] >= high);
            prop_assert!(end == 0 || array[end - 1] < high);
            prop_assert!(end == n - 1 || array[end + 1] > high);
        }
    }
}
