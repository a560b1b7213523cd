//! Gap filling ("signal fix-up").
//!
//! Every missing cell is replaced using only the *original* series, never the
//! partially fixed output:
//!
//! - interior gap: mean of both neighbours if both are present, otherwise the
//!   one present neighbour, otherwise `0.0`
//! - first cell: the original last cell, else its right neighbour, else `0.0`
//! - last cell: the original first cell, else its left neighbour, else `0.0`
//!
//! Present cells pass through unchanged, including real `0.0` readings.

use crate::domain::Series;

/// Gap-fill a series; name and unit are preserved.
pub fn fix(series: &Series) -> Series {
    Series {
        name: series.name.clone(),
        unit: series.unit.clone(),
        samples: fix_values(&series.samples).into_iter().map(Some).collect(),
    }
}

/// Gap-fill raw samples.
pub fn fix_values(samples: &[Option<f64>]) -> Vec<f64> {
    let n = samples.len();
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| match sample {
            Some(v) => *v,
            None if i == 0 => samples[n - 1]
                .or_else(|| samples.get(1).copied().flatten())
                .unwrap_or(0.0),
            None if i == n - 1 => samples[0].or(samples[n - 2]).unwrap_or(0.0),
            None => match (samples[i - 1], samples[i + 1]) {
                (Some(left), Some(right)) => (left + right) / 2.0,
                (Some(only), None) | (None, Some(only)) => only,
                (None, None) => 0.0,
            },
        })
        .collect()
}

/// Replace missing cells with `0.0`.
pub fn zero_fill(samples: &[Option<f64>]) -> Vec<f64> {
    samples.iter().map(|s| s.unwrap_or(0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(s: &Series) -> Vec<f64> {
        s.samples.iter().map(|v| v.unwrap()).collect()
    }

    #[test]
    fn endpoints_take_the_opposite_end() {
        let s = Series::new("x", "W", vec![None, Some(4.0), None]);
        assert_eq!(values(&fix(&s)), vec![4.0, 4.0, 4.0]);

        let s = Series::new("x", "W", vec![None, Some(1.0), Some(9.0)]);
        assert_eq!(fix_values(&s.samples), vec![9.0, 1.0, 9.0]);

        let s = vec![Some(2.0), Some(5.0), None];
        assert_eq!(fix_values(&s), vec![2.0, 5.0, 2.0]);
    }

    #[test]
    fn both_ends_missing_fall_back_to_their_neighbour() {
        let samples = vec![None, Some(3.0), Some(4.0), Some(7.0), None];
        assert_eq!(fix_values(&samples), vec![3.0, 3.0, 4.0, 7.0, 7.0]);
        assert_eq!(fix_values(&[None, None, Some(1.0), None]), vec![0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn one_missing_end_with_interior_gaps() {
        let samples = vec![None, Some(2.0), None, Some(6.0), None, None, Some(9.0), Some(5.0)];
        assert_eq!(
            fix_values(&samples),
            vec![5.0, 2.0, 4.0, 6.0, 6.0, 9.0, 9.0, 5.0]
        );

        let samples = vec![Some(1.0), None, Some(3.0), Some(8.0), None, None];
        assert_eq!(fix_values(&samples), vec![1.0, 2.0, 3.0, 8.0, 8.0, 1.0]);
    }

    #[test]
    fn interior_gaps_use_original_neighbours() {
        let samples = vec![Some(1.0), None, Some(3.0), None, None, Some(8.0)];
        // Index 3 sees only its left neighbour; index 4 only its right one.
        assert_eq!(fix_values(&samples), vec![1.0, 2.0, 3.0, 3.0, 8.0, 8.0]);
    }

    #[test]
    fn isolated_interior_gap_without_neighbours_is_zero() {
        let samples = vec![Some(5.0), None, None, None, Some(6.0)];
        assert_eq!(fix_values(&samples), vec![5.0, 5.0, 0.0, 6.0, 6.0]);
    }

    #[test]
    fn all_missing_becomes_zero() {
        assert_eq!(fix_values(&[None, None]), vec![0.0, 0.0]);
        assert_eq!(fix_values(&[None]), vec![0.0]);
        assert!(fix_values(&[]).is_empty());
    }

    #[test]
    fn real_zero_readings_are_kept() {
        let samples = vec![Some(2.0), Some(0.0), Some(4.0)];
        assert_eq!(fix_values(&samples), vec![2.0, 0.0, 4.0]);
    }

    #[test]
    fn idempotent_on_complete_series() {
        let s = Series::from_values("p", "kW", &[1.0, -2.0, 0.0, 3.5]);
        let once = fix(&s);
        assert_eq!(once, s);
        assert_eq!(fix(&once), once);
        assert_eq!(once.unit, "kW");
    }

    #[test]
    fn zero_fill_only_touches_missing_cells() {
        assert_eq!(zero_fill(&[Some(1.5), None, Some(-1.0)]), vec![1.5, 0.0, -1.0]);
    }
}
