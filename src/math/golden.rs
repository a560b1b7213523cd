//! Golden-section search.
//!
//! Derivative-free minimization of a unimodal function on `[a, b]`. Each
//! level of the recursion shrinks the bracket by `1/φ` and hands one of its
//! two interior points (with its already computed value) down to the next
//! level, so after the first level only one new evaluation is needed.

/// `1/φ`
const INV_PHI: f64 = 0.618_033_988_749_894_9;
/// `1/φ²`
const INV_PHI2: f64 = 0.381_966_011_250_105_1;

/// Minimize `f` on `[a, b]`; returns the final bracket `(lo, hi)` with
/// `hi - lo <= tol`. Callers usually take the midpoint.
///
/// The bounds may be given in either order. A non-positive `tol` is raised to
/// a few ulps of the bracket so the recursion always terminates.
pub fn golden_section_search<F>(mut f: F, a: f64, b: f64, tol: f64) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let floor = 4.0 * f64::EPSILON * a.abs().max(b.abs()).max(1.0);
    let tol = if tol.is_finite() && tol > floor { tol } else { floor };
    bisect(&mut f, a, b, tol, b - a, None, None)
}

/// One level of the search. `lower`/`upper` carry an interior point and its
/// value reused from the previous level.
fn bisect<F>(
    f: &mut F,
    a: f64,
    b: f64,
    tol: f64,
    h: f64,
    lower: Option<(f64, f64)>,
    upper: Option<(f64, f64)>,
) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    if h <= tol {
        return (a, b);
    }
    let (c, fc) = match lower {
        Some(point) => point,
        None => {
            let c = a + INV_PHI2 * h;
            (c, f(c))
        }
    };
    let (d, fd) = match upper {
        Some(point) => point,
        None => {
            let d = a + INV_PHI * h;
            (d, f(d))
        }
    };

    if fc < fd {
        bisect(f, a, d, tol, h * INV_PHI, None, Some((c, fc)))
    } else {
        bisect(f, c, b, tol, h * INV_PHI, Some((d, fd)), None)
    }
}
