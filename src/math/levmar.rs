//! Levenberg–Marquardt solver for small dense nonlinear least squares.
//!
//! The peak fitter repeatedly solves problems of the form:
//!
//! ```text
//! minimize Σ (y_i - f(x_i; p))^2  over p
//! ```
//!
//! where `f` is a fixed analytic lineshape with a handful of parameters.
//!
//! How it works here:
//! - Classic Marquardt damping: solve `(JᵀJ + λ·diag(JᵀJ)) δ = Jᵀr`, raise λ
//!   when a step is rejected, lower it when accepted.
//! - The damped normal equations are solved by Cholesky. `JᵀJ` is positive
//!   semi-definite, so a failed factorization means rank deficiency and the
//!   step is retried with more damping.
//! - Because the parameter dimension is tiny (4) and columns hold at most a
//!   few thousand samples, forming `JᵀJ` explicitly is adequate.
//! - The parameter covariance follows the least-squares convention
//!   `(JᵀJ)⁻¹ · sse / (n − p)` at the solution, so downstream uncertainty
//!   numbers line up with the usual curve-fitting tools.

use nalgebra::{DMatrix, DVector};

use crate::error::FitFailure;

const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;
/// Floor applied to `diag(JᵀJ)` entries so damping always has a direction to act on.
const MIN_DIAG: f64 = 1e-12;

/// Options controlling one Levenberg–Marquardt run.
#[derive(Debug, Clone, Copy)]
pub struct LevMarOptions {
    /// Iteration cap; exhausting it is a convergence failure.
    pub max_iterations: usize,
    /// Relative cost-improvement threshold: stop once an accepted step
    /// improves `sse` by less than `ftol · sse`.
    pub ftol: f64,
    /// Relative parameter-step threshold.
    pub xtol: f64,
    /// Gradient infinity-norm threshold.
    pub gtol: f64,
    /// Initial damping factor λ.
    pub lambda_init: f64,
}

impl Default for LevMarOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
            lambda_init: 1e-3,
        }
    }
}

/// A converged fit with its scaled covariance.
#[derive(Debug, Clone)]
pub struct LevMarFit {
    pub params: DVector<f64>,
    /// `(JᵀJ)⁻¹ · sse / (n − p)` at the solution.
    pub covariance: DMatrix<f64>,
    pub sse: f64,
    pub iterations: usize,
}

/// Minimize the squared norm of `residuals(p)` starting from `initial`.
///
/// `residuals` must return `y − f(x; p)` and `jacobian` the model Jacobian
/// `∂f/∂p` (one row per sample, one column per parameter). Either closure may
/// return `None` to signal a non-evaluable parameter vector; at the starting
/// point that aborts the fit, later it rejects the candidate step.
///
/// Every failure mode (no convergence within the cap, rank-deficient normal
/// equations at the solution, non-finite numbers, fewer samples than
/// parameters) is reported as [`FitFailure`].
pub fn levmar<R, J>(
    initial: DVector<f64>,
    residuals: R,
    jacobian: J,
    opts: &LevMarOptions,
) -> Result<LevMarFit, FitFailure>
where
    R: Fn(&DVector<f64>) -> Option<DVector<f64>>,
    J: Fn(&DVector<f64>) -> Option<DMatrix<f64>>,
{
    if opts.max_iterations == 0 {
        return Err(FitFailure::new("iteration cap must be at least 1"));
    }
    let p_len = initial.len();
    let mut params = initial;

    let mut resid = residuals(&params)
        .filter(|r| r.iter().all(|v| v.is_finite()))
        .ok_or_else(|| FitFailure::new("residuals are not finite at the initial guess"))?;
    let n = resid.len();
    if n <= p_len {
        return Err(FitFailure::new(format!(
            "underdetermined fit: {n} samples for {p_len} parameters"
        )));
    }

    let mut sse = resid.norm_squared();
    let mut lambda = opts.lambda_init;
    let mut iterations = 0;

    for iter in 1..=opts.max_iterations {
        iterations = iter;

        let jac = jacobian(&params)
            .filter(|j| j.iter().all(|v| v.is_finite()))
            .ok_or_else(|| FitFailure::new("Jacobian is not finite"))?;
        let jtj = jac.transpose() * &jac;
        let gradient = jac.transpose() * &resid;

        if gradient.amax() <= opts.gtol {
            break;
        }

        // Inner damping ladder: escalate λ until a step is both solvable and
        // an actual improvement.
        let mut stepped = false;
        while lambda <= LAMBDA_MAX {
            let Some(delta) = solve_damped(&jtj, &gradient, lambda) else {
                lambda *= LAMBDA_UP;
                continue;
            };
            let candidate = &params + &delta;
            let Some(candidate_resid) = residuals(&candidate) else {
                lambda *= LAMBDA_UP;
                continue;
            };
            let candidate_sse = candidate_resid.norm_squared();
            if !candidate_sse.is_finite() || candidate_sse > sse {
                lambda *= LAMBDA_UP;
                continue;
            }

            let improvement = sse - candidate_sse;
            let max_rel_step = delta
                .iter()
                .zip(params.iter())
                .map(|(d, p)| d.abs() / (p.abs() + opts.xtol))
                .fold(0.0_f64, f64::max);

            params = candidate;
            resid = candidate_resid;
            sse = candidate_sse;
            lambda = (lambda * LAMBDA_DOWN).max(LAMBDA_MIN);
            stepped = true;

            if improvement <= opts.ftol * sse.max(f64::MIN_POSITIVE) || max_rel_step <= opts.xtol {
                return finish(params, sse, iterations, &jacobian, n, p_len);
            }
            break;
        }

        if !stepped {
            return Err(FitFailure::new(format!(
                "no acceptable step at iteration {iter} (damping exhausted)"
            )));
        }

        if iter == opts.max_iterations {
            return Err(FitFailure::new(format!(
                "no convergence after {} iterations",
                opts.max_iterations
            )));
        }
    }

    finish(params, sse, iterations, &jacobian, n, p_len)
}

fn finish<J>(
    params: DVector<f64>,
    sse: f64,
    iterations: usize,
    jacobian: &J,
    n: usize,
    p_len: usize,
) -> Result<LevMarFit, FitFailure>
where
    J: Fn(&DVector<f64>) -> Option<DMatrix<f64>>,
{
    let jac = jacobian(&params)
        .filter(|j| j.iter().all(|v| v.is_finite()))
        .ok_or_else(|| FitFailure::new("Jacobian is not finite at the solution"))?;
    let jtj = jac.transpose() * &jac;

    // Rank-deficient JᵀJ at the solution means the parameters are not all
    // identified; there is no meaningful covariance to report.
    let inverse = jtj
        .cholesky()
        .map(|ch| ch.inverse())
        .ok_or_else(|| FitFailure::new("singular normal equations at the solution"))?;

    let scale = sse / (n - p_len) as f64;
    let covariance = inverse * scale;
    if !covariance.iter().all(|v| v.is_finite()) {
        return Err(FitFailure::new("covariance is not finite"));
    }

    Ok(LevMarFit {
        params,
        covariance,
        sse,
        iterations,
    })
}

/// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = g`, or `None` if the damped matrix does not factor.
fn solve_damped(jtj: &DMatrix<f64>, gradient: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut damped = jtj.clone();
    for i in 0..damped.nrows() {
        let d = damped[(i, i)].max(MIN_DIAG);
        damped[(i, i)] = d + lambda * d;
    }
    let solution = damped.cholesky()?.solve(gradient);
    if solution.iter().all(|v| v.is_finite()) {
        Some(solution)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp_model(x: f64, p: &DVector<f64>) -> f64 {
        p[0] * (-p[1] * x).exp()
    }

    #[test]
    fn recovers_exponential_decay() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64 * 0.25).collect();
        let truth = DVector::from_row_slice(&[2.0, 0.7]);
        let ys: Vec<f64> = xs.iter().map(|&x| exp_model(x, &truth)).collect();

        let residuals = |p: &DVector<f64>| {
            Some(DVector::from_iterator(
                xs.len(),
                xs.iter().zip(&ys).map(|(&x, &y)| y - exp_model(x, p)),
            ))
        };
        let jacobian = |p: &DVector<f64>| {
            Some(DMatrix::from_fn(xs.len(), 2, |i, j| {
                let x = xs[i];
                let e = (-p[1] * x).exp();
                if j == 0 { e } else { -p[0] * x * e }
            }))
        };

        let fit = levmar(
            DVector::from_row_slice(&[1.0, 0.2]),
            residuals,
            jacobian,
            &LevMarOptions::default(),
        )
        .unwrap();

        assert!((fit.params[0] - 2.0).abs() < 1e-6);
        assert!((fit.params[1] - 0.7).abs() < 1e-6);
        assert!(fit.sse < 1e-12);
        assert!(fit.covariance.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn underdetermined_problem_fails() {
        let residuals = |_: &DVector<f64>| Some(DVector::from_row_slice(&[1.0, 2.0]));
        let jacobian = |_: &DVector<f64>| Some(DMatrix::zeros(2, 3));
        let err = levmar(
            DVector::zeros(3),
            residuals,
            jacobian,
            &LevMarOptions::default(),
        )
        .unwrap_err();
        assert!(err.reason().contains("underdetermined"));
    }

    #[test]
    fn unidentified_parameter_fails_with_singular_covariance() {
        // Second parameter never enters the model, so JᵀJ has a zero column.
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 3.0 * x).collect();
        let residuals = |p: &DVector<f64>| {
            Some(DVector::from_iterator(
                xs.len(),
                xs.iter().zip(&ys).map(|(&x, &y)| y - p[0] * x),
            ))
        };
        let jacobian = |_: &DVector<f64>| {
            Some(DMatrix::from_fn(xs.len(), 2, |i, j| {
                if j == 0 { xs[i] } else { 0.0 }
            }))
        };
        let err = levmar(
            DVector::from_row_slice(&[1.0, 0.0]),
            residuals,
            jacobian,
            &LevMarOptions::default(),
        )
        .unwrap_err();
        assert!(err.reason().contains("singular"));
    }

    #[test]
    fn non_finite_initial_residuals_fail() {
        let residuals = |_: &DVector<f64>| Some(DVector::from_row_slice(&[f64::NAN; 5]));
        let jacobian = |_: &DVector<f64>| Some(DMatrix::zeros(5, 2));
        let err = levmar(
            DVector::zeros(2),
            residuals,
            jacobian,
            &LevMarOptions::default(),
        )
        .unwrap_err();
        assert!(err.reason().contains("initial guess"));
    }
}
