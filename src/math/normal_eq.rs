//! Normal-equation solve for Gauss-Newton steps.
//!
//! Each Gauss-Newton iteration solves a tiny square system
//!
//! ```text
//! (JᵀJ) step = -Jᵀ r
//! ```
//!
//! where `J` is the residual Jacobian (rows = samples, columns = parameters)
//! and `r` the residual vector. With 3 parameters an LU decomposition of the
//! `3×3` matrix is all we need.

use nalgebra::{DMatrix, DVector};

/// Solve the Gauss-Newton normal equations for `step`.
///
/// Returns `None` if `JᵀJ` is singular or the solution is not finite.
pub fn solve_normal_equations(jacobian: &DMatrix<f64>, residuals: &DVector<f64>) -> Option<DVector<f64>> {
    if jacobian.nrows() != residuals.len() || jacobian.ncols() == 0 {
        return None;
    }
    let jt = jacobian.transpose();
    let a = &jt * jacobian;
    let b = -(&jt * residuals);

    let step = a.lu().solve(&b)?;
    if step.iter().all(|v| v.is_finite()) {
        Some(step)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_linear_least_squares_step() {
        // Residual r(β) = y - (β0 + β1 x) at β = 0 on y = 2 + 3x, x = [0,1,2].
        // J = -[1, x]; the full step lands on β = (2, 3).
        let j = DMatrix::from_row_slice(3, 2, &[-1.0, -0.0, -1.0, -1.0, -1.0, -2.0]);
        let r = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let step = solve_normal_equations(&j, &r).unwrap();
        assert!((step[0] - 2.0).abs() < 1e-10);
        assert!((step[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn singular_system_reports_none() {
        // Two identical columns: JᵀJ has rank 1.
        let j = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let r = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_normal_equations(&j, &r).is_none());
    }

    #[test]
    fn shape_mismatch_reports_none() {
        let j = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let r = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_normal_equations(&j, &r).is_none());
    }
}
