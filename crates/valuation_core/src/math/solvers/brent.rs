//! Brent's bracketing root finder.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Bracketing root finder mixing bisection with secant and inverse
/// quadratic steps.
///
/// Needs a sign change over `[a, b]` and no derivative. The bracket shrinks
/// every step, so a continuous function always yields a root within the
/// iteration cap unless the tolerance is unreachable. The IRR solver falls
/// back to it when Newton's method leaves the rate domain.
///
/// # Example
///
/// ```
/// use valuation_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
///
/// // -100 today, 60 and 60 over the next two years
/// let npv = |r: f64| -100.0 + 60.0 / (1.0 + r) + 60.0 / ((1.0 + r) * (1.0 + r));
/// let rate = solver.find_root(npv, -0.5, 1.0).unwrap();
/// assert!(npv(rate).abs() < 1e-9);
/// assert!((rate - 0.1307).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Solver with the given stopping rule.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Solver with [`SolverConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Stopping rule in use.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Root of `f` between `lo` and `hi` (either order).
    ///
    /// # Errors
    ///
    /// - `SolverError::NoBracket` when `f(lo)` and `f(hi)` share a sign
    /// - `SolverError::MaxIterationsExceeded` when the cap is reached
    pub fn find_root<F>(&self, f: F, lo: T, hi: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let half = T::from(0.5).unwrap_or_else(T::one);
        let two = T::one() + T::one();
        let three = two + T::one();

        // b is the current estimate, a the previous one, c the point
        // opposite b across the root
        let (mut a, mut b) = (lo, hi);
        let (mut fa, mut fb) = (f(a), f(b));
        if fa * fb > T::zero() {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let (mut c, mut fc) = (b, fb);
        let mut step = b - a;
        let mut prev_step = step;

        for _ in 0..self.config.max_iterations {
            if (fb > T::zero() && fc > T::zero()) || (fb < T::zero() && fc < T::zero()) {
                c = a;
                fc = fa;
                step = b - a;
                prev_step = step;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            if self.config.converged(fb) {
                return Ok(b);
            }

            let tol = two * T::epsilon() * b.abs() + half * self.config.tolerance.max(T::zero());
            let mid = half * (c - b);
            if mid.abs() <= tol || fb == T::zero() {
                return Ok(b);
            }

            if prev_step.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (two * mid * s, T::one() - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (two * mid * q * (q - r) - (b - a) * (r - T::one())),
                        (q - T::one()) * (r - T::one()) * (s - T::one()),
                    )
                };
                if p > T::zero() {
                    q = -q;
                } else {
                    p = -p;
                }

                let limit = (three * mid * q - (tol * q).abs()).min((prev_step * q).abs());
                if two * p < limit {
                    prev_step = step;
                    step = p / q;
                } else {
                    step = mid;
                    prev_step = mid;
                }
            } else {
                step = mid;
                prev_step = mid;
            }

            a = b;
            fa = fb;
            b = if step.abs() > tol {
                b + step
            } else if mid > T::zero() {
                b + tol
            } else {
                b - tol
            };
            fb = f(b);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
