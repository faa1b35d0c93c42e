//! Lorentzian (Cauchy) lineshape evaluation.
//!
//! The solver needs exactly two things from the model: the lineshape value
//! at a frequency (residuals, plots) and its partial derivatives (Jacobian
//! columns). Both are pure functions of the frequency and a [`PeakParams`]
//! set.

use std::f64::consts::PI;

use crate::domain::PeakParams;

/// Evaluate the lineshape at frequency `x`:
///
/// `amplitude / (π · hwhm · (1 + ((x − center)/hwhm)²)) + offset`
///
/// The first term is the normalized Cauchy density scaled by `amplitude`, so
/// with `offset = 0` the value at `x = center` is exactly `amplitude / (π · hwhm)`.
pub fn lorentzian(x: f64, p: &PeakParams) -> f64 {
    let u = (x - p.center) / p.hwhm;
    p.amplitude / (PI * p.hwhm * (1.0 + u * u)) + p.offset
}

/// Evaluate the lineshape over a whole frequency axis.
pub fn lorentzian_curve(xs: &[f64], p: &PeakParams) -> Vec<f64> {
    xs.iter().map(|&x| lorentzian(x, p)).collect()
}

/// Partial derivatives of [`lorentzian`] at `x`, in solver parameter order
/// `[center, hwhm, amplitude, offset]`.
pub fn lorentzian_jacobian_row(x: f64, p: &PeakParams) -> [f64; 4] {
    let u = (x - p.center) / p.hwhm;
    let denom = 1.0 + u * u;
    let denom2 = denom * denom;
    let hwhm2 = p.hwhm * p.hwhm;

    let d_center = 2.0 * p.amplitude * u / (PI * hwhm2 * denom2);
    let d_hwhm = p.amplitude * (u * u - 1.0) / (PI * hwhm2 * denom2);
    let d_amplitude = 1.0 / (PI * p.hwhm * denom);
    let d_offset = 1.0;

    [d_center, d_hwhm, d_amplitude, d_offset]
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn peak_value_at_center() {
        let p = PeakParams::new(2.0, 0.3, 5.0, 0.0);
        let got = lorentzian(2.0, &p);
        let want = 5.0 / (PI * 0.3);
        assert_eq!(got, want);
    }

    #[test]
    fn offset_shifts_the_whole_curve() {
        let base = PeakParams::new(1.0, 0.2, 3.0, 0.0);
        let lifted = PeakParams::new(1.0, 0.2, 3.0, 0.5);
        for x in [0.0, 0.5, 1.0, 1.7, 4.0] {
            assert!((lorentzian(x, &lifted) - lorentzian(x, &base) - 0.5).abs() < TOL);
        }
    }

    #[test]
    fn symmetric_about_center() {
        let p = PeakParams::new(2.0, 0.3, 5.0, 0.1);
        for d in [0.01, 0.1, 0.5, 1.3, 10.0] {
            let left = lorentzian(2.0 - d, &p);
            let right = lorentzian(2.0 + d, &p);
            assert!((left - right).abs() < TOL, "asymmetric at d={d}");
        }
    }

    #[test]
    fn curve_matches_scalar_evaluation() {
        let p = PeakParams::new(0.7, 0.15, 2.0, 0.05);
        let xs = [0.0, 0.3, 0.7, 1.1, 2.0];
        let ys = lorentzian_curve(&xs, &p);
        assert_eq!(ys.len(), xs.len());
        for (x, y) in xs.iter().zip(&ys) {
            assert_eq!(*y, lorentzian(*x, &p));
        }
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let p = PeakParams::new(2.0, 0.3, 5.0, 0.1);
        let h = 1e-6;
        for x in [0.5, 1.9, 2.0, 2.4, 3.5] {
            let row = lorentzian_jacobian_row(x, &p);
            let arr = p.to_array();
            for k in 0..4 {
                let mut hi = arr;
                let mut lo = arr;
                hi[k] += h;
                lo[k] -= h;
                let num = (lorentzian(x, &PeakParams::from_array(hi))
                    - lorentzian(x, &PeakParams::from_array(lo)))
                    / (2.0 * h);
                assert!(
                    (row[k] - num).abs() < 1e-5,
                    "param {k} at x={x}: analytic {} vs numeric {num}",
                    row[k]
                );
            }
        }
    }
}
